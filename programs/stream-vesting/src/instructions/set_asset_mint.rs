use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::state::Factory;

/// Switches the asset streamed by future executions. Live controllers keep their own mint.
pub fn handler(ctx: Context<SetAssetMint>) -> Result<()> {
    let factory = &mut ctx.accounts.factory;
    factory.require_admin(&ctx.accounts.admin.key())?;

    let old = factory.asset_mint;
    factory.asset_mint = ctx.accounts.new_asset_mint.key();

    emit!(AssetMintSet {
        factory: factory.key(),
        old_asset_mint: old,
        new_asset_mint: factory.asset_mint,
        custody: ctx.accounts.factory_custody.key(),
    });

    msg!("Factory asset switched from {} to {}", old, factory.asset_mint);

    Ok(())
}

#[derive(Accounts)]
pub struct SetAssetMint<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    pub new_asset_mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = admin,
        token::mint = new_asset_mint,
        token::authority = factory,
        seeds = [FACTORY_CUSTODY_SEED, factory.key().as_ref(), new_asset_mint.key().as_ref()],
        bump
    )]
    pub factory_custody: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct AssetMintSet {
    pub factory: Pubkey,
    pub old_asset_mint: Pubkey,
    pub new_asset_mint: Pubkey,
    pub custody: Pubkey,
}
