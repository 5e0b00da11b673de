use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::state::{Factory, StreamController, VestingSchedule};
use crate::utils::custody;

/// Administrator stop: closes the flow, sweeps custody to treasury and retires the schedule.
/// Repeat calls find an empty custody and move nothing.
pub fn handler(ctx: Context<StopStream>) -> Result<()> {
    ctx.accounts.factory.require_admin(&ctx.accounts.admin.key())?;

    let now = Clock::get()?.unix_timestamp;
    let closure = ctx
        .accounts
        .schedule
        .retire(
            Some(&mut **ctx.accounts.controller),
            now,
            ctx.accounts.controller_custody.amount,
        )?
        .ok_or(StreamVestingError::ControllerMismatch)?;

    custody::pay_closure(
        &ctx.accounts.controller,
        &ctx.accounts.controller_custody,
        Some(&*ctx.accounts.receiver_asset_account),
        &ctx.accounts.treasury_asset_account,
        &ctx.accounts.factory.treasury,
        &ctx.accounts.token_program,
        closure,
    )?;

    msg!(
        "Stream for schedule {} stopped, {} swept to treasury",
        ctx.accounts.schedule.schedule_id,
        closure.remaining
    );

    Ok(())
}

#[derive(Accounts)]
pub struct StopStream<'info> {
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
        has_one = controller,
    )]
    pub schedule: Box<Account<'info, VestingSchedule>>,

    #[account(mut)]
    pub controller: Box<Account<'info, StreamController>>,

    #[account(mut)]
    pub controller_custody: Box<Account<'info, TokenAccount>>,

    /// Asset account of the wallet the flow currently pays.
    #[account(mut)]
    pub receiver_asset_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub treasury_asset_account: Box<Account<'info, TokenAccount>>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}
