use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::state::{Factory, StreamController, VestingSchedule};
use crate::utils::rights::{self, HookEffect};
use crate::utils::custody;

/// Moves the ownership token and, in the same instruction, redirects the live flow.
pub fn handler(ctx: Context<TransferRights>) -> Result<()> {
    let rights_mint_key = ctx.accounts.rights_mint.key();
    let from = rights::owner_of(&ctx.accounts.from_rights_account, &rights_mint_key)?;
    rights::check_transfer(&from, &ctx.accounts.holder.key(), &ctx.accounts.to.key())?;
    if let Some(controller) = ctx.accounts.controller.as_ref() {
        require_keys_eq!(
            controller.key(),
            ctx.accounts.schedule.controller,
            StreamVestingError::ControllerMismatch
        );
    }

    let factory = &ctx.accounts.factory;
    let rights_mint = &ctx.accounts.rights_mint;
    let token_program = &ctx.accounts.token_program;
    rights::thaw(factory, rights_mint, &ctx.accounts.from_rights_account, token_program)?;
    rights::thaw(factory, rights_mint, &ctx.accounts.to_rights_account, token_program)?;
    token::transfer(
        CpiContext::new(
            token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.from_rights_account.to_account_info(),
                to: ctx.accounts.to_rights_account.to_account_info(),
                authority: ctx.accounts.holder.to_account_info(),
            },
        ),
        1,
    )?;
    rights::freeze(factory, rights_mint, &ctx.accounts.to_rights_account, token_program)?;

    ctx.accounts.to_rights_account.reload()?;
    let new_holder = rights::owner_of(&ctx.accounts.to_rights_account, &rights_mint_key)?;

    let now = Clock::get()?.unix_timestamp;
    let custody_balance = ctx
        .accounts
        .controller_custody
        .as_ref()
        .map(|c| c.amount)
        .unwrap_or(0);
    let effect = rights::run_hook(
        &mut ctx.accounts.schedule,
        ctx.accounts.controller.as_deref_mut().map(|c| &mut **c),
        Some(from),
        Some(new_holder),
        now,
        custody_balance,
    )?;

    let mut settled = 0;
    if let HookEffect::Redirected(payout) = effect {
        let (Some(controller), Some(controller_custody), Some(previous_account)) = (
            ctx.accounts.controller.as_ref(),
            ctx.accounts.controller_custody.as_ref(),
            ctx.accounts.holder_asset_account.as_ref(),
        ) else {
            return err!(StreamVestingError::ControllerMismatch);
        };
        custody::pay_redirect(
            controller,
            controller_custody,
            previous_account,
            &ctx.accounts.token_program,
            payout,
        )?;
        settled = payout.amount;
    }

    emit!(RightsTransferred {
        schedule_id: ctx.accounts.schedule.schedule_id,
        rights_mint: rights_mint_key,
        from,
        to: new_holder,
        redirected: matches!(effect, HookEffect::Redirected(_)),
        settled,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct TransferRights<'info> {
    #[account(
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Box<Account<'info, Factory>>,

    #[account(
        mut,
        seeds = [SCHEDULE_SEED, factory.key().as_ref(), &schedule.schedule_id.to_le_bytes()],
        bump = schedule.bump,
        has_one = factory,
        has_one = rights_mint,
    )]
    pub schedule: Box<Account<'info, VestingSchedule>>,

    pub rights_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        token::mint = rights_mint,
        token::authority = holder,
    )]
    pub from_rights_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: any wallet may receive the ownership token.
    pub to: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = holder,
        associated_token::mint = rights_mint,
        associated_token::authority = to,
    )]
    pub to_rights_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub holder: Signer<'info>,

    /// Required when the schedule has a live stream.
    #[account(mut)]
    pub controller: Option<Box<Account<'info, StreamController>>>,

    #[account(mut)]
    pub controller_custody: Option<Box<Account<'info, TokenAccount>>>,

    /// Receives the outgoing holder's accrued flow.
    #[account(mut)]
    pub holder_asset_account: Option<Box<Account<'info, TokenAccount>>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct RightsTransferred {
    pub schedule_id: u64,
    pub rights_mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub redirected: bool,
    pub settled: u64,
}
