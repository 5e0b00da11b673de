use anchor_lang::prelude::*;

use crate::error::{StreamResult, StreamVestingError};
use crate::state::{StreamClosure, StreamController};
use crate::utils::flow;

/// Deferred commitment to stream `rate_per_second` across `[start_time, end_time)`.
/// Seeds: [b"schedule", factory, schedule_id.to_le_bytes()]
#[account]
pub struct VestingSchedule {
    pub factory: Pubkey,
    pub schedule_id: u64,
    /// Only wallet allowed to claim-execute.
    pub recipient: Pubkey,
    pub rate_per_second: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub created_at: i64,
    /// false -> true once, never back.
    pub executed: bool,
    /// true -> false once, terminal.
    pub active: bool,
    /// Stream controller created by claim-execution; default key when none.
    pub controller: Pubkey,
    /// Ownership token mint; default key until executed.
    pub rights_mint: Pubkey,
    pub bump: u8,
}

impl VestingSchedule {
    pub const SIZE: usize =
        32 + // factory
        8 +  // schedule_id
        32 + // recipient
        8 +  // rate_per_second
        8 +  // start_time
        8 +  // end_time
        8 +  // created_at
        1 +  // executed
        1 +  // active
        32 + // controller
        32 + // rights_mint
        1;   // bump

    /// Parameter checks for a new schedule created at `now`.
    pub fn validate_params(
        recipient: &Pubkey,
        rate_per_second: u64,
        start_time: i64,
        end_time: i64,
        now: i64,
    ) -> StreamResult<()> {
        if *recipient == Pubkey::default()
            || rate_per_second == 0
            || end_time <= start_time
            || start_time < now
        {
            return Err(StreamVestingError::InvalidParameters);
        }
        // Window must be fundable without overflow.
        flow::scheduled_total(rate_per_second, start_time, end_time)?;
        Ok(())
    }

    pub fn total_amount(&self) -> StreamResult<u64> {
        flow::scheduled_total(self.rate_per_second, self.start_time, self.end_time)
    }

    pub fn duration(&self) -> StreamResult<u64> {
        let d = self
            .end_time
            .checked_sub(self.start_time)
            .ok_or(StreamVestingError::MathOverflow)?;
        u64::try_from(d).map_err(|_| StreamVestingError::MathOverflow)
    }

    pub fn has_controller(&self) -> bool {
        self.controller != Pubkey::default()
    }

    /// Recipient claim path. Returns the amount to move into the new controller.
    /// Checks run caller, then state, then funding.
    pub fn check_claim(
        &self,
        caller: &Pubkey,
        now: i64,
        factory_balance: u64,
    ) -> StreamResult<u64> {
        if *caller != self.recipient {
            return Err(StreamVestingError::Unauthorized);
        }
        if !self.active || self.executed || now < self.start_time {
            return Err(StreamVestingError::StreamError);
        }
        let total = self.total_amount()?;
        if factory_balance < total {
            return Err(StreamVestingError::BalanceError);
        }
        Ok(total)
    }

    /// Administrative override. No time or funding check.
    pub fn check_direct(&self) -> StreamResult<()> {
        if !self.active || self.executed {
            return Err(StreamVestingError::StreamError);
        }
        Ok(())
    }

    pub fn mark_executed(&mut self, rights_mint: Pubkey) -> StreamResult<()> {
        if self.executed {
            return Err(StreamVestingError::StreamError);
        }
        self.executed = true;
        self.rights_mint = rights_mint;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Claim execution once custody is funded and the token minted: binds the
    /// controller and opens its flow to `holder`.
    pub fn launch(
        &mut self,
        controller: &mut StreamController,
        controller_key: Pubkey,
        rights_mint: Pubkey,
        holder: Pubkey,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<()> {
        self.mark_executed(rights_mint)?;
        self.controller = controller_key;
        controller.open_stream(holder, now, custody_balance)
    }

    /// Administrative execution. A recorded controller is stopped first and
    /// must be supplied; no funds move into a new one.
    pub fn direct_execute(
        &mut self,
        controller: Option<&mut StreamController>,
        rights_mint: Pubkey,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<Option<StreamClosure>> {
        self.check_direct()?;
        let closure = self.stop_recorded(controller, now, custody_balance)?;
        self.mark_executed(rights_mint)?;
        Ok(closure)
    }

    /// Stops the recorded controller (if any) and deactivates the schedule.
    pub fn retire(
        &mut self,
        controller: Option<&mut StreamController>,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<Option<StreamClosure>> {
        let closure = self.stop_recorded(controller, now, custody_balance)?;
        self.deactivate();
        Ok(closure)
    }

    fn stop_recorded(
        &self,
        controller: Option<&mut StreamController>,
        now: i64,
        custody_balance: u64,
    ) -> StreamResult<Option<StreamClosure>> {
        if !self.has_controller() {
            return Ok(None);
        }
        let controller = controller.ok_or(StreamVestingError::ControllerMismatch)?;
        controller.stop(now, custody_balance).map(Some)
    }
}
