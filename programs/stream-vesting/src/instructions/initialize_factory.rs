use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::state::{require_non_null, validate_metadata_base, Factory};

pub fn handler(
    ctx: Context<InitializeFactory>,
    campaign: Pubkey,
    treasury: Pubkey,
    metadata_base: String,
) -> Result<()> {
    require_non_null(&campaign)?;
    require_non_null(&treasury)?;
    validate_metadata_base(&metadata_base)?;

    let factory = &mut ctx.accounts.factory;
    factory.campaign = campaign;
    factory.admin = ctx.accounts.admin.key();
    factory.treasury = treasury;
    factory.asset_mint = ctx.accounts.asset_mint.key();
    factory.schedule_count = 0;
    factory.metadata_base = metadata_base;
    factory.bump = ctx.bumps.factory;

    emit!(FactoryInitialized {
        factory: factory.key(),
        campaign,
        admin: factory.admin,
        treasury,
        asset_mint: factory.asset_mint,
        custody: ctx.accounts.factory_custody.key(),
    });

    msg!("Stream factory initialized for campaign {}", campaign);

    Ok(())
}

#[derive(Accounts)]
#[instruction(campaign: Pubkey)]
pub struct InitializeFactory<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Factory::SIZE,
        seeds = [FACTORY_SEED, campaign.as_ref()],
        bump
    )]
    pub factory: Account<'info, Factory>,

    #[account(
        init,
        payer = admin,
        token::mint = asset_mint,
        token::authority = factory,
        seeds = [FACTORY_CUSTODY_SEED, factory.key().as_ref(), asset_mint.key().as_ref()],
        bump
    )]
    pub factory_custody: Account<'info, TokenAccount>,

    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct FactoryInitialized {
    pub factory: Pubkey,
    pub campaign: Pubkey,
    pub admin: Pubkey,
    pub treasury: Pubkey,
    pub asset_mint: Pubkey,
    pub custody: Pubkey,
}
