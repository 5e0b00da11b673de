use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{require_non_null, Factory};

pub fn handler(ctx: Context<SetAdministrator>, new_admin: Pubkey) -> Result<()> {
    let factory = &mut ctx.accounts.factory;
    factory.require_admin(&ctx.accounts.admin.key())?;
    require_non_null(&new_admin)?;

    let old = factory.admin;
    factory.admin = new_admin;

    emit!(AdministratorSet {
        factory: factory.key(),
        old_admin: old,
        new_admin,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetAdministrator<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    pub admin: Signer<'info>,
}

#[event]
pub struct AdministratorSet {
    pub factory: Pubkey,
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
}
