use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::state::Factory;

pub fn handler(ctx: Context<DepositToFactory>, amount: u64) -> Result<()> {
    require!(amount > 0, StreamVestingError::InvalidParameters);

    let factory = &ctx.accounts.factory;
    require_keys_eq!(
        ctx.accounts.depositor_token_account.mint,
        factory.asset_mint,
        StreamVestingError::InvalidTokenMint
    );
    require_keys_eq!(
        ctx.accounts.depositor_token_account.owner,
        ctx.accounts.depositor.key(),
        StreamVestingError::InvalidTokenAccount
    );

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.depositor_token_account.to_account_info(),
                to: ctx.accounts.factory_custody.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts.factory_custody.reload()?;

    emit!(FactoryFunded {
        factory: factory.key(),
        depositor: ctx.accounts.depositor.key(),
        amount,
        custody_balance: ctx.accounts.factory_custody.amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct DepositToFactory<'info> {
    #[account(
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    #[account(
        mut,
        seeds = [FACTORY_CUSTODY_SEED, factory.key().as_ref(), factory.asset_mint.as_ref()],
        bump,
    )]
    pub factory_custody: Account<'info, TokenAccount>,

    #[account(mut)]
    pub depositor_token_account: Account<'info, TokenAccount>,

    pub depositor: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct FactoryFunded {
    pub factory: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub custody_balance: u64,
}
