//! Continuous-flow accounting.
//! - a flow pays `rate` units per second to a single receiver
//! - accrual = rate * (now - since), zero when the clock has not advanced
//! - realized amounts never exceed what custody actually holds

use anchor_lang::prelude::*;

use crate::error::{StreamResult, StreamVestingError};

/// A token movement produced by the flow ledger, applied by the caller as a CPI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub to: Pubkey,
    pub amount: u64,
}

/// Amount needed to fund `rate_per_second` across `[start_time, end_time)`.
pub fn scheduled_total(
    rate_per_second: u64,
    start_time: i64,
    end_time: i64,
) -> StreamResult<u64> {
    if end_time <= start_time {
        return Err(StreamVestingError::InvalidParameters);
    }
    let duration = end_time
        .checked_sub(start_time)
        .ok_or(StreamVestingError::MathOverflow)?;
    let total = (rate_per_second as u128)
        .checked_mul(duration as u128)
        .ok_or(StreamVestingError::MathOverflow)?;
    u64::try_from(total).map_err(|_| StreamVestingError::MathOverflow)
}

/// Gross accrual since `since`, not yet capped by custody.
pub fn accrued_since(rate_per_second: u64, since: i64, now: i64) -> StreamResult<u64> {
    if now <= since {
        return Ok(0);
    }
    let elapsed = now
        .checked_sub(since)
        .ok_or(StreamVestingError::MathOverflow)?;
    let gross = (rate_per_second as u128)
        .checked_mul(elapsed as u128)
        .ok_or(StreamVestingError::MathOverflow)?;
    Ok(u64::try_from(gross).unwrap_or(u64::MAX))
}

/// Accrual that can actually be paid out of `available` custody.
pub fn realizable(
    rate_per_second: u64,
    since: i64,
    now: i64,
    available: u64,
) -> StreamResult<u64> {
    Ok(accrued_since(rate_per_second, since, now)?.min(available))
}
