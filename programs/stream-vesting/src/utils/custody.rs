//! Token movements out of a controller's custody, signed by the controller PDA.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::CONTROLLER_SEED;
use crate::error::StreamVestingError;
use crate::state::{StreamClosure, StreamController};
use crate::utils::flow::Payout;

/// Destination must be an asset account owned by `owner`.
pub fn require_asset_account(account: &TokenAccount, owner: &Pubkey, mint: &Pubkey) -> Result<()> {
    require_keys_eq!(account.mint, *mint, StreamVestingError::InvalidTokenMint);
    require_keys_eq!(account.owner, *owner, StreamVestingError::InvalidTokenAccount);
    Ok(())
}

pub fn require_custody(controller: &StreamController, custody: &Account<'_, TokenAccount>) -> Result<()> {
    require_keys_eq!(custody.key(), controller.custody, StreamVestingError::InvalidTokenAccount);
    require_keys_eq!(custody.mint, controller.asset_mint, StreamVestingError::InvalidTokenMint);
    Ok(())
}

/// Transfers `amount` from custody; no CPI for zero.
pub fn release<'info>(
    controller: &Account<'info, StreamController>,
    custody: &Account<'info, TokenAccount>,
    destination: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let id_bytes = controller.schedule_id.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[
        CONTROLLER_SEED,
        controller.factory.as_ref(),
        &id_bytes,
        &[controller.bump],
    ]];
    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            Transfer {
                from: custody.to_account_info(),
                to: destination.to_account_info(),
                authority: controller.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}

/// Pays the previous receiver after a redirect to `controller.receiver`.
pub fn pay_redirect<'info>(
    controller: &Account<'info, StreamController>,
    custody: &Account<'info, TokenAccount>,
    previous_account: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    payout: Payout,
) -> Result<()> {
    require_custody(controller, custody)?;
    require_asset_account(previous_account, &payout.to, &controller.asset_mint)?;
    release(controller, custody, previous_account, token_program, payout.amount)?;

    emit!(StreamRedirected {
        schedule_id: controller.schedule_id,
        controller: controller.key(),
        from: payout.to,
        to: controller.receiver,
        settled: payout.amount,
        rate_per_second: controller.rate_per_second,
    });
    Ok(())
}

/// Pays the last receiver of a closed flow, then sweeps the rest to treasury.
#[allow(clippy::too_many_arguments)]
pub fn pay_closure<'info>(
    controller: &Account<'info, StreamController>,
    custody: &Account<'info, TokenAccount>,
    receiver_account: Option<&Account<'info, TokenAccount>>,
    treasury_account: &Account<'info, TokenAccount>,
    treasury: &Pubkey,
    token_program: &Program<'info, Token>,
    closure: StreamClosure,
) -> Result<()> {
    require_custody(controller, custody)?;
    require_asset_account(treasury_account, treasury, &controller.asset_mint)?;

    let mut settled = 0;
    if let Some(payout) = closure.payout {
        let receiver_account = receiver_account.ok_or(StreamVestingError::InvalidTokenAccount)?;
        require_asset_account(receiver_account, &payout.to, &controller.asset_mint)?;
        release(controller, custody, receiver_account, token_program, payout.amount)?;
        settled = payout.amount;
    }
    release(controller, custody, treasury_account, token_program, closure.remaining)?;

    emit!(StreamClosed {
        schedule_id: controller.schedule_id,
        controller: controller.key(),
        receiver: controller.receiver,
        settled,
        remaining_amount: closure.remaining,
        treasury: *treasury,
    });
    Ok(())
}

#[event]
pub struct StreamRedirected {
    pub schedule_id: u64,
    pub controller: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub settled: u64,
    pub rate_per_second: u64,
}

#[event]
pub struct StreamClosed {
    pub schedule_id: u64,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub settled: u64,
    pub remaining_amount: u64,
    pub treasury: Pubkey,
}
