//! Ledger errors.
//!
//! Every variant is a precondition failure local to the operation that
//! raised it; a rejected operation leaves state and the event log untouched.

use thiserror::Error;
use x1c_types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("Insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: u128, allowed: u128 },

    #[error("Invalid recipient: cannot send to the zero address")]
    InvalidRecipient,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Only team wallet can release tokens")]
    Unauthorized,

    #[error("Tokens are still locked until {unlock_at}")]
    StillLocked { unlock_at: Timestamp },

    #[error("No locked tokens left")]
    NothingToRelease,

    #[error("Already staking")]
    AlreadyStaking,

    #[error("No active stake")]
    NoActiveStake,

    #[error("Staking period not completed: withdrawable at {withdrawable_at}")]
    StakingPeriodNotComplete { withdrawable_at: Timestamp },

    #[error("arithmetic overflow in ledger computation")]
    Overflow,

    #[error("invalid genesis configuration: {0}")]
    InvalidGenesis(String),

    #[error("conservation invariant violated: supply {expected}, accounted {actual}")]
    ConservationViolated { expected: u128, actual: u128 },

    #[error("snapshot encoding error: {0}")]
    Encoding(String),
}

/// Result type for ledger operations.
pub type TokenResult<T> = Result<T, TokenError>;

impl TokenError {
    /// Stable, label-friendly name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::InsufficientBalance { .. } => "InsufficientBalance",
            TokenError::InsufficientAllowance { .. } => "InsufficientAllowance",
            TokenError::InvalidRecipient => "InvalidRecipient",
            TokenError::InvalidAmount => "InvalidAmount",
            TokenError::Unauthorized => "Unauthorized",
            TokenError::StillLocked { .. } => "StillLocked",
            TokenError::NothingToRelease => "NothingToRelease",
            TokenError::AlreadyStaking => "AlreadyStaking",
            TokenError::NoActiveStake => "NoActiveStake",
            TokenError::StakingPeriodNotComplete { .. } => "StakingPeriodNotComplete",
            TokenError::Overflow => "Overflow",
            TokenError::InvalidGenesis(_) => "InvalidGenesis",
            TokenError::ConservationViolated { .. } => "ConservationViolated",
            TokenError::Encoding(_) => "Encoding",
        }
    }
}
