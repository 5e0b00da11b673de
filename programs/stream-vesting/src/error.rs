use anchor_lang::prelude::*;

/// Custom error codes for the stream vesting program.
#[error_code]
pub enum StreamVestingError {
    #[msg("Unauthorized: caller failed an identity or role check")]
    Unauthorized,

    #[msg("Invalid parameters")]
    InvalidParameters,

    #[msg("Schedule or stream is not in a state that allows this operation")]
    StreamError,

    #[msg("Insufficient custody balance")]
    BalanceError,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Invalid token mint")]
    InvalidTokenMint,

    #[msg("Invalid token account")]
    InvalidTokenAccount,

    #[msg("Stream controller does not belong to this schedule")]
    ControllerMismatch,
}

/// Result of the pure state-machine and accounting functions.
pub type StreamResult<T> = std::result::Result<T, StreamVestingError>;
