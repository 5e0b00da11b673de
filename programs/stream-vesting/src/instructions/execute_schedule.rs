use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::state::{Factory, StreamController, VestingSchedule};
use crate::utils::rights;

/// Recipient claim: fund a fresh controller, mint the ownership token, open the flow.
/// Everything below commits or reverts with the transaction.
pub fn handler(ctx: Context<ExecuteSchedule>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let total_amount = ctx.accounts.schedule.check_claim(
        &ctx.accounts.recipient.key(),
        now,
        ctx.accounts.factory_custody.amount,
    )?;

    let schedule_id = ctx.accounts.schedule.schedule_id;
    let controller_key = ctx.accounts.controller.key();
    let rights_mint_key = ctx.accounts.rights_mint.key();

    let fresh = StreamController::for_schedule(
        ctx.accounts.factory.key(),
        ctx.accounts.schedule.key(),
        &ctx.accounts.schedule,
        ctx.accounts.asset_mint.key(),
        ctx.accounts.controller_custody.key(),
        now,
        ctx.bumps.controller,
        ctx.bumps.controller_custody,
    )?;
    ctx.accounts.controller.set_inner(fresh);

    // Custody handoff: factory -> controller, exact scheduled total.
    let factory = &ctx.accounts.factory;
    let bump = [factory.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[FACTORY_SEED, factory.campaign.as_ref(), &bump]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.factory_custody.to_account_info(),
                to: ctx.accounts.controller_custody.to_account_info(),
                authority: factory.to_account_info(),
            },
            signer_seeds,
        ),
        total_amount,
    )?;

    rights::mint_locked(
        &ctx.accounts.factory,
        &ctx.accounts.rights_mint,
        &ctx.accounts.recipient_rights_account,
        &ctx.accounts.token_program,
    )?;

    ctx.accounts.controller_custody.reload()?;
    ctx.accounts.recipient_rights_account.reload()?;
    let holder = rights::owner_of(&ctx.accounts.recipient_rights_account, &rights_mint_key)?;
    ctx.accounts.schedule.launch(
        &mut ctx.accounts.controller,
        controller_key,
        rights_mint_key,
        holder,
        now,
        ctx.accounts.controller_custody.amount,
    )?;

    emit!(ScheduleExecuted {
        schedule_id,
        recipient: holder,
        controller: controller_key,
        rights_mint: rights_mint_key,
        funded_amount: total_amount,
        direct: false,
    });
    emit!(StreamOpened {
        schedule_id,
        controller: controller_key,
        receiver: holder,
        rate_per_second: ctx.accounts.controller.rate_per_second,
        custody_balance: ctx.accounts.controller_custody.amount,
    });

    msg!(
        "Schedule {} executed: {} moved to controller {}, flowing to {}",
        schedule_id,
        total_amount,
        controller_key,
        holder
    );

    Ok(())
}

#[derive(Accounts)]
pub struct ExecuteSchedule<'info> {
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
        mut,
        seeds = [FACTORY_CUSTODY_SEED, factory.key().as_ref(), factory.asset_mint.as_ref()],
        bump,
    )]
    pub factory_custody: Box<Account<'info, TokenAccount>>,

    #[account(address = factory.asset_mint @ StreamVestingError::InvalidTokenMint)]
    pub asset_mint: Box<Account<'info, Mint>>,

    // init_if_needed so that a repeat call reaches the handler and fails on the
    // schedule state instead of on account creation.
    #[account(
        init_if_needed,
        payer = recipient,
        space = 8 + StreamController::SIZE,
        seeds = [CONTROLLER_SEED, factory.key().as_ref(), &schedule.schedule_id.to_le_bytes()],
        bump
    )]
    pub controller: Box<Account<'info, StreamController>>,

    #[account(
        init_if_needed,
        payer = recipient,
        token::mint = asset_mint,
        token::authority = controller,
        seeds = [CONTROLLER_CUSTODY_SEED, controller.key().as_ref()],
        bump
    )]
    pub controller_custody: Box<Account<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = recipient,
        mint::decimals = RIGHTS_DECIMALS,
        mint::authority = factory,
        mint::freeze_authority = factory,
        seeds = [RIGHTS_MINT_SEED, factory.key().as_ref(), &schedule.schedule_id.to_le_bytes()],
        bump
    )]
    pub rights_mint: Box<Account<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = recipient,
        associated_token::mint = rights_mint,
        associated_token::authority = recipient,
    )]
    pub recipient_rights_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub recipient: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct ScheduleExecuted {
    pub schedule_id: u64,
    pub recipient: Pubkey,
    /// Default key for direct executions.
    pub controller: Pubkey,
    pub rights_mint: Pubkey,
    pub funded_amount: u64,
    pub direct: bool,
}

#[event]
pub struct StreamOpened {
    pub schedule_id: u64,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub rate_per_second: u64,
    pub custody_balance: u64,
}
