use anchor_lang::prelude::*;

use crate::error::{StreamResult, StreamVestingError};
use crate::state::VestingSchedule;
use crate::utils::flow::{self, Payout};

/// Unopened -> Flowing -> (redirect)* -> Closed. Closed is terminal.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControllerStatus {
    #[default]
    Unopened,
    Flowing,
    Closed,
}

/// Custodies one executed schedule's funds and drives its flow.
/// Seeds: [b"controller", factory, schedule_id.to_le_bytes()]
///
/// The flow record (`receiver`, `flow_updated_at`) is ledger state: who the
/// open flow currently pays. The rights holder itself is never stored here;
/// every operation that moves the flow reads it from the holder's token account.
///
/// The flow is a continuous ledger, not a copy of the schedule window: it
/// accrues from the moment it opens (the claim time, which may be after
/// `start_time`) and is bounded only by custody. Custody is funded with exactly
/// `rate * (end_time - start_time)`, so a late claim streams the same total but
/// finishes after `end_time`.
#[account]
pub struct StreamController {
    pub factory: Pubkey,
    /// Back-reference to the schedule record.
    pub schedule: Pubkey,
    pub schedule_id: u64,
    pub asset_mint: Pubkey,
    /// Token account holding this stream's funds.
    pub custody: Pubkey,
    /// Copied from the schedule at creation.
    pub rate_per_second: u64,
    /// end_time - start_time of the schedule.
    pub scheduled_duration: u64,
    pub status: ControllerStatus,
    pub receiver: Pubkey,
    /// Accrual for `receiver` starts here.
    pub flow_updated_at: i64,
    /// Everything paid out to holders so far.
    pub streamed_total: u64,
    pub bump: u8,
    pub custody_bump: u8,
}

/// Result of closing a flow: what the last receiver is owed and what goes back to treasury.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamClosure {
    pub payout: Option<Payout>,
    pub remaining: u64,
}

impl StreamController {
    pub const SIZE: usize =
        32 + // factory
        32 + // schedule
        8 +  // schedule_id
        32 + // asset_mint
        32 + // custody
        8 +  // rate_per_second
        8 +  // scheduled_duration
        1 +  // status
        32 + // receiver
        8 +  // flow_updated_at
        8 +  // streamed_total
        1 +  // bump
        1;   // custody_bump

    /// Fresh, unopened controller for a schedule being claim-executed.
    #[allow(clippy::too_many_arguments)]
    pub fn for_schedule(
        factory: Pubkey,
        schedule_key: Pubkey,
        schedule: &VestingSchedule,
        asset_mint: Pubkey,
        custody: Pubkey,
        now: i64,
        bump: u8,
        custody_bump: u8,
    ) -> StreamResult<Self> {
        Ok(Self {
            factory,
            schedule: schedule_key,
            schedule_id: schedule.schedule_id,
            asset_mint,
            custody,
            rate_per_second: schedule.rate_per_second,
            scheduled_duration: schedule.duration()?,
            status: ControllerStatus::Unopened,
            receiver: Pubkey::default(),
            flow_updated_at: now,
            streamed_total: 0,
            bump,
            custody_bump,
        })
    }

    /// Custody needed to cover the whole scheduled duration.
    pub fn required_custody(&self) -> StreamResult<u64> {
        let total = (self.rate_per_second as u128)
            .checked_mul(self.scheduled_duration as u128)
            .ok_or(StreamVestingError::MathOverflow)?;
        u64::try_from(total).map_err(|_| StreamVestingError::MathOverflow)
    }

    /// Opens the flow to `holder`. Exactly once, from `Unopened`.
    pub fn open_stream(
        &mut self,
        holder: Pubkey,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<()> {
        if self.status != ControllerStatus::Unopened {
            return Err(StreamVestingError::StreamError);
        }
        if custody_balance < self.required_custody()? {
            return Err(StreamVestingError::BalanceError);
        }
        self.status = ControllerStatus::Flowing;
        self.receiver = holder;
        self.flow_updated_at = now;
        Ok(())
    }

    /// Closes the flow to the previous receiver and reopens it to `new_holder`
    /// at the same rate. Returns what the previous receiver accrued.
    pub fn redirect(
        &mut self,
        new_holder: Pubkey,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<Payout> {
        if self.status != ControllerStatus::Flowing {
            return Err(StreamVestingError::StreamError);
        }
        let payout = self.take_accrued(now, custody_balance)?;
        self.receiver = new_holder;
        Ok(payout)
    }

    /// Realizes the current receiver's accrual without touching the rate.
    pub fn settle(&mut self, now: i64, custody_balance: u64) -> StreamResult<Payout> {
        if self.status != ControllerStatus::Flowing {
            return Err(StreamVestingError::StreamError);
        }
        self.take_accrued(now, custody_balance)
    }

    /// `settle` on behalf of `holder`, who must be the current receiver.
    pub fn settle_holder(
        &mut self,
        holder: &Pubkey,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<Payout> {
        if self.receiver != *holder {
            return Err(StreamVestingError::ControllerMismatch);
        }
        self.settle(now, custody_balance)
    }

    /// Closes the flow and reports what is left for the treasury.
    /// Calling again after `Closed` pays nobody and returns whatever custody still holds.
    pub fn stop(&mut self, now: i64, custody_balance: u64) -> StreamResult<StreamClosure> {
        match self.status {
            ControllerStatus::Unopened => Err(StreamVestingError::StreamError),
            ControllerStatus::Closed => Ok(StreamClosure {
                payout: None,
                remaining: custody_balance,
            }),
            ControllerStatus::Flowing => {
                let payout = self.take_accrued(now, custody_balance)?;
                self.status = ControllerStatus::Closed;
                let remaining = custody_balance
                    .checked_sub(payout.amount)
                    .ok_or(StreamVestingError::MathOverflow)?;
                Ok(StreamClosure {
                    payout: Some(payout),
                    remaining,
                })
            }
        }
    }

    /// Current flow rate toward `who`.
    pub fn flow_rate_to(&self, who: &Pubkey) -> u64 {
        if self.status == ControllerStatus::Flowing && self.receiver == *who {
            self.rate_per_second
        } else {
            0
        }
    }

    /// What the current receiver could realize right now.
    pub fn accrued(&self, now: i64, custody_balance: u64) -> StreamResult<u64> {
        if self.status != ControllerStatus::Flowing {
            return Ok(0);
        }
        flow::realizable(self.rate_per_second, self.flow_updated_at, now, custody_balance)
    }

    fn take_accrued(&mut self, now: i64, custody_balance: u64) -> StreamResult<Payout> {
        let amount = self.accrued(now, custody_balance)?;
        self.streamed_total = self
            .streamed_total
            .checked_add(amount)
            .ok_or(StreamVestingError::MathOverflow)?;
        self.flow_updated_at = self.flow_updated_at.max(now);
        Ok(Payout {
            to: self.receiver,
            amount,
        })
    }
}
