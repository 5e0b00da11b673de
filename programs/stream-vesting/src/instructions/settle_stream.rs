use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::state::{Factory, StreamController, VestingSchedule};
use crate::utils::{custody, rights};

/// Pays the current holder what the flow has accrued so far. Permissionless;
/// funds can only go to the holder.
pub fn handler(ctx: Context<SettleStream>) -> Result<()> {
    let holder = rights::owner_of(
        &ctx.accounts.holder_rights_account,
        &ctx.accounts.schedule.rights_mint,
    )?;
    let controller = &mut ctx.accounts.controller;
    custody::require_custody(controller, &ctx.accounts.controller_custody)?;
    custody::require_asset_account(
        &ctx.accounts.holder_asset_account,
        &holder,
        &controller.asset_mint,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let payout = controller.settle_holder(&holder, now, ctx.accounts.controller_custody.amount)?;
    custody::release(
        controller,
        &ctx.accounts.controller_custody,
        &ctx.accounts.holder_asset_account,
        &ctx.accounts.token_program,
        payout.amount,
    )?;

    emit!(StreamSettled {
        schedule_id: controller.schedule_id,
        controller: controller.key(),
        receiver: holder,
        amount: payout.amount,
        streamed_total: controller.streamed_total,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SettleStream<'info> {
    #[account(
        seeds = [FACTORY_SEED, factory.campaign.as_ref()],
        bump = factory.bump,
    )]
    pub factory: Box<Account<'info, Factory>>,

    #[account(
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

    /// Token account currently holding the ownership token.
    pub holder_rights_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub holder_asset_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct StreamSettled {
    pub schedule_id: u64,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
    pub streamed_total: u64,
}
