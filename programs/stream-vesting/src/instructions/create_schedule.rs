use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{Factory, VestingSchedule};

pub fn handler(
    ctx: Context<CreateSchedule>,
    recipient: Pubkey,
    rate_per_second: u64,
    start_time: i64,
    end_time: i64,
) -> Result<()> {
    let factory = &mut ctx.accounts.factory;
    factory.require_admin(&ctx.accounts.admin.key())?;

    let now = Clock::get()?.unix_timestamp;
    VestingSchedule::validate_params(&recipient, rate_per_second, start_time, end_time, now)?;

    let schedule_id = factory.allocate_schedule_id()?;

    let schedule = &mut ctx.accounts.schedule;
    schedule.factory = factory.key();
    schedule.schedule_id = schedule_id;
    schedule.recipient = recipient;
    schedule.rate_per_second = rate_per_second;
    schedule.start_time = start_time;
    schedule.end_time = end_time;
    schedule.created_at = now;
    schedule.executed = false;
    schedule.active = true;
    schedule.controller = Pubkey::default();
    schedule.rights_mint = Pubkey::default();
    schedule.bump = ctx.bumps.schedule;

    emit!(ScheduleCreated {
        factory: schedule.factory,
        schedule_id,
        recipient,
        rate_per_second,
        start_time,
        end_time,
        total_amount: schedule.total_amount()?,
    });

    msg!("Schedule {} created for {}", schedule_id, recipient);

    Ok(())
}

#[derive(Accounts)]
pub struct CreateSchedule<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    #[account(
        init,
        payer = admin,
        space = 8 + VestingSchedule::SIZE,
        seeds = [SCHEDULE_SEED, factory.key().as_ref(), &factory.schedule_count.to_le_bytes()],
        bump
    )]
    pub schedule: Account<'info, VestingSchedule>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct ScheduleCreated {
    pub factory: Pubkey,
    pub schedule_id: u64,
    pub recipient: Pubkey,
    pub rate_per_second: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub total_amount: u64,
}
