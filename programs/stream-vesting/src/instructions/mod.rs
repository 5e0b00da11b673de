pub mod burn_rights;
pub mod create_schedule;
pub mod deposit_to_factory;
pub mod direct_execute_schedule;
pub mod emit_schedule_quote;
pub mod execute_schedule;
pub mod initialize_factory;
pub mod set_administrator;
pub mod set_asset_mint;
pub mod set_metadata_base;
pub mod set_treasury;
pub mod settle_stream;
pub mod stop_stream;
pub mod transfer_rights;

pub use burn_rights::*;
pub use create_schedule::*;
pub use deposit_to_factory::*;
pub use direct_execute_schedule::*;
pub use emit_schedule_quote::*;
pub use execute_schedule::*;
pub use initialize_factory::*;
pub use set_administrator::*;
pub use set_asset_mint::*;
pub use set_metadata_base::*;
pub use set_treasury::*;
pub use settle_stream::*;
pub use stop_stream::*;
pub use transfer_rights::*;
