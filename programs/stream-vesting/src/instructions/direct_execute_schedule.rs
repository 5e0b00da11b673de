use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::instructions::execute_schedule::ScheduleExecuted;
use crate::state::{Factory, StreamController, VestingSchedule};
use crate::utils::{custody, rights};

/// Administrative override: mints the ownership token without funding a stream.
/// Unlike the claim path there is no start-time or custody check.
pub fn handler(ctx: Context<DirectExecuteSchedule>) -> Result<()> {
    ctx.accounts.factory.require_admin(&ctx.accounts.admin.key())?;

    let schedule_id = ctx.accounts.schedule.schedule_id;
    let rights_mint_key = ctx.accounts.rights_mint.key();
    let now = Clock::get()?.unix_timestamp;

    if let Some(controller) = ctx.accounts.controller.as_ref() {
        require_keys_eq!(
            controller.key(),
            ctx.accounts.schedule.controller,
            StreamVestingError::ControllerMismatch
        );
    }
    let custody_balance = ctx
        .accounts
        .controller_custody
        .as_ref()
        .map(|c| c.amount)
        .unwrap_or(0);
    let closure = ctx.accounts.schedule.direct_execute(
        ctx.accounts.controller.as_deref_mut().map(|c| &mut **c),
        rights_mint_key,
        now,
        custody_balance,
    )?;

    if let Some(closure) = closure {
        let (Some(controller), Some(controller_custody), Some(treasury_account)) = (
            ctx.accounts.controller.as_ref(),
            ctx.accounts.controller_custody.as_ref(),
            ctx.accounts.treasury_asset_account.as_ref(),
        ) else {
            return err!(StreamVestingError::ControllerMismatch);
        };
        custody::pay_closure(
            controller,
            controller_custody,
            ctx.accounts.receiver_asset_account.as_deref(),
            treasury_account,
            &ctx.accounts.factory.treasury,
            &ctx.accounts.token_program,
            closure,
        )?;
    }

    rights::mint_locked(
        &ctx.accounts.factory,
        &ctx.accounts.rights_mint,
        &ctx.accounts.recipient_rights_account,
        &ctx.accounts.token_program,
    )?;

    let schedule = &ctx.accounts.schedule;
    emit!(ScheduleExecuted {
        schedule_id,
        recipient: schedule.recipient,
        controller: schedule.controller,
        rights_mint: rights_mint_key,
        funded_amount: 0,
        direct: true,
    });

    msg!("Schedule {} direct-executed by admin", schedule_id);

    Ok(())
}

#[derive(Accounts)]
pub struct DirectExecuteSchedule<'info> {
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
    )]
    pub schedule: Box<Account<'info, VestingSchedule>>,

    #[account(
        init_if_needed,
        payer = admin,
        mint::decimals = RIGHTS_DECIMALS,
        mint::authority = factory,
        mint::freeze_authority = factory,
        seeds = [RIGHTS_MINT_SEED, factory.key().as_ref(), &schedule.schedule_id.to_le_bytes()],
        bump
    )]
    pub rights_mint: Box<Account<'info, Mint>>,

    /// CHECK: only used as the token account authority; pinned to the schedule recipient.
    #[account(address = schedule.recipient @ StreamVestingError::InvalidParameters)]
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = admin,
        associated_token::mint = rights_mint,
        associated_token::authority = recipient,
    )]
    pub recipient_rights_account: Box<Account<'info, TokenAccount>>,

    /// Required only when the schedule already has a controller.
    #[account(mut)]
    pub controller: Option<Box<Account<'info, StreamController>>>,

    #[account(mut)]
    pub controller_custody: Option<Box<Account<'info, TokenAccount>>>,

    #[account(mut)]
    pub receiver_asset_account: Option<Box<Account<'info, TokenAccount>>>,

    #[account(mut)]
    pub treasury_asset_account: Option<Box<Account<'info, TokenAccount>>>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
