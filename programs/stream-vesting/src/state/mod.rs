pub mod factory;
pub mod stream_controller;
pub mod vesting_schedule;

pub use factory::*;
pub use stream_controller::*;
pub use vesting_schedule::*;
