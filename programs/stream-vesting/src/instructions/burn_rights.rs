use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::StreamVestingError;
use crate::state::{Factory, StreamController, VestingSchedule};
use crate::utils::rights::{self, HookEffect};
use crate::utils::custody;

/// Burns the ownership token. The stream (if any) is stopped and the schedule
/// becomes permanently inactive.
pub fn handler(ctx: Context<BurnRights>) -> Result<()> {
    let rights_mint_key = ctx.accounts.rights_mint.key();
    let holder = rights::owner_of(&ctx.accounts.holder_rights_account, &rights_mint_key)?;
    rights::require_holder(&holder, &ctx.accounts.holder.key())?;
    if let Some(controller) = ctx.accounts.controller.as_ref() {
        require_keys_eq!(
            controller.key(),
            ctx.accounts.schedule.controller,
            StreamVestingError::ControllerMismatch
        );
    }

    let rights_mint = &ctx.accounts.rights_mint;
    rights::thaw(
        &ctx.accounts.factory,
        rights_mint,
        &ctx.accounts.holder_rights_account,
        &ctx.accounts.token_program,
    )?;
    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: rights_mint.to_account_info(),
                from: ctx.accounts.holder_rights_account.to_account_info(),
                authority: ctx.accounts.holder.to_account_info(),
            },
        ),
        1,
    )?;

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
        Some(holder),
        None,
        now,
        custody_balance,
    )?;
    let HookEffect::Retired(closure) = effect else {
        return err!(StreamVestingError::StreamError);
    };

    let mut remaining_amount = 0;
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
            ctx.accounts.holder_asset_account.as_deref(),
            treasury_account,
            &ctx.accounts.factory.treasury,
            &ctx.accounts.token_program,
            closure,
        )?;
        remaining_amount = closure.remaining;
    }

    let schedule_id = ctx.accounts.schedule.schedule_id;
    emit!(RightsBurned {
        schedule_id,
        rights_mint: rights_mint_key,
        holder,
        remaining_amount,
    });

    msg!("Rights for schedule {} burned by {}", schedule_id, holder);

    Ok(())
}

#[derive(Accounts)]
pub struct BurnRights<'info> {
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

    #[account(mut)]
    pub rights_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        token::mint = rights_mint,
        token::authority = holder,
    )]
    pub holder_rights_account: Box<Account<'info, TokenAccount>>,

    pub holder: Signer<'info>,

    #[account(mut)]
    pub controller: Option<Box<Account<'info, StreamController>>>,

    #[account(mut)]
    pub controller_custody: Option<Box<Account<'info, TokenAccount>>>,

    /// Receives the holder's final accrual.
    #[account(mut)]
    pub holder_asset_account: Option<Box<Account<'info, TokenAccount>>>,

    #[account(mut)]
    pub treasury_asset_account: Option<Box<Account<'info, TokenAccount>>>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct RightsBurned {
    pub schedule_id: u64,
    pub rights_mint: Pubkey,
    pub holder: Pubkey,
    pub remaining_amount: u64,
}
