use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::state::{ControllerStatus, Factory, StreamController, VestingSchedule};

/// Read-only snapshot of a schedule and its stream, published as an event.
pub fn handler(ctx: Context<EmitScheduleQuote>) -> Result<()> {
    let factory = &ctx.accounts.factory;
    let schedule = &ctx.accounts.schedule;
    let now = Clock::get()?.unix_timestamp;

    let mut status = ControllerStatus::Unopened;
    let mut receiver = Pubkey::default();
    let mut flow_rate = 0;
    let mut accrued = 0;
    let mut custody_balance = 0;
    let mut streamed_total = 0;

    if schedule.has_controller() {
        let (Some(controller), Some(custody)) = (
            ctx.accounts.controller.as_ref(),
            ctx.accounts.controller_custody.as_ref(),
        ) else {
            return err!(StreamVestingError::ControllerMismatch);
        };
        require_keys_eq!(controller.key(), schedule.controller, StreamVestingError::ControllerMismatch);
        require_keys_eq!(custody.key(), controller.custody, StreamVestingError::InvalidTokenAccount);

        status = controller.status;
        receiver = controller.receiver;
        flow_rate = controller.flow_rate_to(&controller.receiver);
        custody_balance = custody.amount;
        accrued = controller.accrued(now, custody_balance)?;
        streamed_total = controller.streamed_total;
    }

    emit!(ScheduleQuote {
        schedule_id: schedule.schedule_id,
        recipient: schedule.recipient,
        rate_per_second: schedule.rate_per_second,
        start_time: schedule.start_time,
        end_time: schedule.end_time,
        total_amount: schedule.total_amount()?,
        executed: schedule.executed,
        active: schedule.active,
        controller: schedule.controller,
        status,
        receiver,
        flow_rate,
        accrued,
        custody_balance,
        streamed_total,
        administrator: factory.admin,
        treasury: factory.treasury,
        token_uri: factory.token_uri(schedule.schedule_id),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EmitScheduleQuote<'info> {
    #[account(
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Box<Account<'info, Factory>>,

    #[account(
        seeds = [SCHEDULE_SEED, factory.key().as_ref(), &schedule.schedule_id.to_le_bytes()],
        bump = schedule.bump,
        has_one = factory,
    )]
    pub schedule: Box<Account<'info, VestingSchedule>>,

    pub controller: Option<Box<Account<'info, StreamController>>>,

    pub controller_custody: Option<Box<Account<'info, TokenAccount>>>,
}

#[event]
pub struct ScheduleQuote {
    pub schedule_id: u64,
    pub recipient: Pubkey,
    pub rate_per_second: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub total_amount: u64,
    pub executed: bool,
    pub active: bool,
    pub controller: Pubkey,
    pub status: ControllerStatus,
    pub receiver: Pubkey,
    pub flow_rate: u64,
    pub accrued: u64,
    pub custody_balance: u64,
    pub streamed_total: u64,
    pub administrator: Pubkey,
    pub treasury: Pubkey,
    pub token_uri: String,
}
