use anchor_lang::prelude::*;

use crate::constants::MAX_METADATA_BASE_LEN;
use crate::error::{StreamResult, StreamVestingError};

/// Per-campaign factory PDA. Owns every schedule record of the campaign.
#[account]
pub struct Factory {
    /// Organizational registry entry this factory belongs to.
    pub campaign: Pubkey,
    /// Administrator: creates schedules, direct-executes, stops streams.
    pub admin: Pubkey,
    /// Receives swept custody when a stream is stopped.
    pub treasury: Pubkey,
    /// Underlying asset streamed by newly executed schedules.
    pub asset_mint: Pubkey,
    /// Next schedule id (monotonic, never reused).
    pub schedule_count: u64,
    /// Base URI for ownership token metadata.
    pub metadata_base: String,
    pub bump: u8,
}

impl Factory {
    pub const SIZE: usize =
        32 + // campaign
        32 + // admin
        32 + // treasury
        32 + // asset_mint
        8 +  // schedule_count
        4 + MAX_METADATA_BASE_LEN + // metadata_base
        1;   // bump

    pub fn require_admin(&self, caller: &Pubkey) -> StreamResult<()> {
        if *caller != self.admin {
            return Err(StreamVestingError::Unauthorized);
        }
        Ok(())
    }

    /// Hands out the current id and advances the sequence.
    pub fn allocate_schedule_id(&mut self) -> StreamResult<u64> {
        let id = self.schedule_count;
        self.schedule_count = id
            .checked_add(1)
            .ok_or(StreamVestingError::MathOverflow)?;
        Ok(id)
    }

    pub fn token_uri(&self, schedule_id: u64) -> String {
        format!("{}{}", self.metadata_base, schedule_id)
    }
}

pub fn validate_metadata_base(base: &str) -> StreamResult<()> {
    if base.len() > MAX_METADATA_BASE_LEN {
        return Err(StreamVestingError::InvalidParameters);
    }
    Ok(())
}

/// Rejects the null key for administrative targets.
pub fn require_non_null(key: &Pubkey) -> StreamResult<()> {
    if *key == Pubkey::default() {
        return Err(StreamVestingError::InvalidParameters);
    }
    Ok(())
}
