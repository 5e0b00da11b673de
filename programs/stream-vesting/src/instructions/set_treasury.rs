use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{require_non_null, Factory};

pub fn handler(ctx: Context<SetTreasury>, new_treasury: Pubkey) -> Result<()> {
    let factory = &mut ctx.accounts.factory;
    factory.require_admin(&ctx.accounts.admin.key())?;
    require_non_null(&new_treasury)?;

    let old = factory.treasury;
    factory.treasury = new_treasury;

    emit!(TreasurySet {
        factory: factory.key(),
        old_treasury: old,
        new_treasury,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetTreasury<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    pub admin: Signer<'info>,
}

#[event]
pub struct TreasurySet {
    pub factory: Pubkey,
    pub old_treasury: Pubkey,
    pub new_treasury: Pubkey,
}
