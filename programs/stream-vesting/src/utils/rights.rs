//! Ownership token registry helpers.
//! The token is a supply-1 SPL mint whose holder account stays frozen, so it
//! only moves through this program and every move runs the transfer hook.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, FreezeAccount, Mint, MintTo, ThawAccount, Token, TokenAccount};

use crate::constants::FACTORY_SEED;
use crate::error::{StreamResult, StreamVestingError};
use crate::state::{Factory, StreamClosure, StreamController, VestingSchedule};
use crate::utils::flow::Payout;

/// Current holder of the ownership token, read from the account that holds it.
pub fn owner_of(account: &TokenAccount, rights_mint: &Pubkey) -> StreamResult<Pubkey> {
    if account.mint != *rights_mint {
        return Err(StreamVestingError::InvalidTokenMint);
    }
    if account.amount != 1 {
        return Err(StreamVestingError::Unauthorized);
    }
    Ok(account.owner)
}

/// Only the current holder may move or burn the token.
pub fn require_holder(holder: &Pubkey, signer: &Pubkey) -> StreamResult<()> {
    if holder != signer {
        return Err(StreamVestingError::Unauthorized);
    }
    Ok(())
}

/// Transfers go to a real, different wallet.
pub fn check_transfer(holder: &Pubkey, signer: &Pubkey, to: &Pubkey) -> StreamResult<()> {
    require_holder(holder, signer)?;
    if *to == Pubkey::default() || to == holder {
        return Err(StreamVestingError::InvalidParameters);
    }
    Ok(())
}

/// What the transfer hook must do for a given ownership change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookAction {
    Ignore,
    StopAndDeactivate,
    Redirect(Pubkey),
}

/// `from == None` is a mint, `to == None` is a burn.
pub fn on_ownership_transferred(
    schedule: &VestingSchedule,
    from: Option<Pubkey>,
    to: Option<Pubkey>,
) -> HookAction {
    if from.is_none() {
        return HookAction::Ignore;
    }
    match to {
        None => HookAction::StopAndDeactivate,
        Some(_) if !schedule.active || !schedule.has_controller() => HookAction::Ignore,
        Some(holder) => HookAction::Redirect(holder),
    }
}

/// Ledger outcome of running the hook; the caller turns payouts into transfers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookEffect {
    Unchanged,
    Redirected(Payout),
    Retired(Option<StreamClosure>),
}

/// Runs the transfer hook against the schedule and its controller.
pub fn run_hook(
    schedule: &mut VestingSchedule,
    controller: Option<&mut StreamController>,
    from: Option<Pubkey>,
    to: Option<Pubkey>,
    now: i64,
    custody_balance: u64,
) -> StreamResult<HookEffect> {
    match on_ownership_transferred(schedule, from, to) {
        HookAction::Ignore => Ok(HookEffect::Unchanged),
        HookAction::Redirect(holder) => {
            let controller = controller.ok_or(StreamVestingError::ControllerMismatch)?;
            let payout = controller.redirect(holder, now, custody_balance)?;
            Ok(HookEffect::Redirected(payout))
        }
        HookAction::StopAndDeactivate => {
            let closure = schedule.retire(controller, now, custody_balance)?;
            Ok(HookEffect::Retired(closure))
        }
    }
}

/// Mints the single ownership token to `holder_account` and freezes it there.
pub fn mint_locked<'info>(
    factory: &Account<'info, Factory>,
    rights_mint: &Account<'info, Mint>,
    holder_account: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
) -> Result<()> {
    let bump = [factory.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[FACTORY_SEED, factory.campaign.as_ref(), &bump]];

    token::mint_to(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            MintTo {
                mint: rights_mint.to_account_info(),
                to: holder_account.to_account_info(),
                authority: factory.to_account_info(),
            },
            signer_seeds,
        ),
        1,
    )?;
    freeze(factory, rights_mint, holder_account, token_program)
}

pub fn freeze<'info>(
    factory: &Account<'info, Factory>,
    rights_mint: &Account<'info, Mint>,
    account: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
) -> Result<()> {
    let bump = [factory.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[FACTORY_SEED, factory.campaign.as_ref(), &bump]];
    token::freeze_account(CpiContext::new_with_signer(
        token_program.to_account_info(),
        FreezeAccount {
            account: account.to_account_info(),
            mint: rights_mint.to_account_info(),
            authority: factory.to_account_info(),
        },
        signer_seeds,
    ))
}

/// Thaws `account` if it is frozen; no-op otherwise.
pub fn thaw<'info>(
    factory: &Account<'info, Factory>,
    rights_mint: &Account<'info, Mint>,
    account: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
) -> Result<()> {
    if !account.is_frozen() {
        return Ok(());
    }
    let bump = [factory.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[FACTORY_SEED, factory.campaign.as_ref(), &bump]];
    token::thaw_account(CpiContext::new_with_signer(
        token_program.to_account_info(),
        ThawAccount {
            account: account.to_account_info(),
            mint: rights_mint.to_account_info(),
            authority: factory.to_account_info(),
        },
        signer_seeds,
    ))
}
