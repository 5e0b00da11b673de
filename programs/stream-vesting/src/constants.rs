//! Program-wide constants.

/// Seed for the per-campaign factory PDA.
pub const FACTORY_SEED: &[u8] = b"factory";

/// Seed for the factory's custody token account (one per asset mint).
pub const FACTORY_CUSTODY_SEED: &[u8] = b"factory_custody";

/// Seed for schedule records.
pub const SCHEDULE_SEED: &[u8] = b"schedule";

/// Seed for per-schedule stream controllers.
pub const CONTROLLER_SEED: &[u8] = b"controller";

/// Seed for a controller's custody token account.
pub const CONTROLLER_CUSTODY_SEED: &[u8] = b"controller_custody";

/// Seed for the per-schedule ownership token mint.
pub const RIGHTS_MINT_SEED: &[u8] = b"rights";

/// Ownership tokens are indivisible.
pub const RIGHTS_DECIMALS: u8 = 0;

/// Max byte length of the metadata base URI.
pub const MAX_METADATA_BASE_LEN: usize = 128;
