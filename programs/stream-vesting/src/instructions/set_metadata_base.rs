use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{validate_metadata_base, Factory};

pub fn handler(ctx: Context<SetMetadataBase>, metadata_base: String) -> Result<()> {
    let factory = &mut ctx.accounts.factory;
    factory.require_admin(&ctx.accounts.admin.key())?;
    validate_metadata_base(&metadata_base)?;

    factory.metadata_base = metadata_base;

    emit!(MetadataBaseSet {
        factory: factory.key(),
        metadata_base: factory.metadata_base.clone(),
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetMetadataBase<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    pub admin: Signer<'info>,
}

#[event]
pub struct MetadataBaseSet {
    pub factory: Pubkey,
    pub metadata_base: String,
}
