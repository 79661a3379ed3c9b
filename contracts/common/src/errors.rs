//! Error Types for the ETHPool Ledger
//!
//! Every rejection happens before any state mutation, so an `Err` always
//! means "nothing changed". Variants carry enough context for a client to
//! tell authorization failures from bad input and temporary pauses.

use crate::types::Address;

/// Result type alias for ledger operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for all ledger errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // ============ Lifecycle Errors ============
    /// Ledger has not been initialized yet
    NotInitialized,

    /// Ledger was already initialized (fatal, never retry)
    AlreadyInitialized,

    // ============ Authorization Errors ============
    /// Operation is reserved for the owner
    NotOwner { caller: Address },

    /// Operation is reserved for participants (the owner cannot deposit or withdraw)
    NotAParticipant { caller: Address },

    /// Address cannot be used as an identity
    InvalidAddress { reason: &'static str },

    /// Transaction spends nothing controlled by the claimed caller
    UnverifiedCaller { caller: Address },

    // ============ State Errors ============
    /// Pool is stopped by the owner
    PoolStopped,

    /// Caller has no unsettled deposit
    NothingDeposited { participant: Address },

    // ============ Amount Errors ============
    /// Zero amount not allowed
    ZeroAmount,

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ Transition Validation Errors ============
    /// Value moved by the transaction does not match the operation
    ValueMismatch { expected: u64, actual: u64 },

    /// Proposed output state does not match re-execution
    InvalidStateTransition,

    /// Required state not present
    StateNotFound,

    /// Witness could not be decoded into an action
    InvalidWitness,

    /// Ledger invariant check failed
    InvariantViolated { reason: &'static str },
}

impl PoolError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "E001_NOT_INITIALIZED",
            Self::AlreadyInitialized => "E002_ALREADY_INITIALIZED",
            Self::NotOwner { .. } => "E010_NOT_OWNER",
            Self::NotAParticipant { .. } => "E011_NOT_PARTICIPANT",
            Self::InvalidAddress { .. } => "E012_INVALID_ADDRESS",
            Self::UnverifiedCaller { .. } => "E013_UNVERIFIED_CALLER",
            Self::PoolStopped => "E020_POOL_STOPPED",
            Self::NothingDeposited { .. } => "E021_NOTHING_DEPOSITED",
            Self::ZeroAmount => "E030_ZERO_AMOUNT",
            Self::Overflow => "E040_OVERFLOW",
            Self::Underflow => "E041_UNDERFLOW",
            Self::DivisionByZero => "E042_DIV_ZERO",
            Self::ValueMismatch { .. } => "E050_VALUE_MISMATCH",
            Self::InvalidStateTransition => "E051_INVALID_STATE",
            Self::StateNotFound => "E052_STATE_NOT_FOUND",
            Self::InvalidWitness => "E053_INVALID_WITNESS",
            Self::InvariantViolated { .. } => "E060_INVARIANT",
        }
    }

    /// Returns true if the same call may succeed later without changes
    /// (only a stopped pool qualifies)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PoolStopped)
    }

    /// Returns true if the caller used the wrong identity for the operation
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotOwner { .. } | Self::NotAParticipant { .. } | Self::UnverifiedCaller { .. }
        )
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner { .. } => write!(f, "{}: not owner", self.code()),
            Self::NotAParticipant { .. } => write!(f, "{}: not user", self.code()),
            Self::InvalidAddress { reason } => write!(f, "{}: {}", self.code(), reason),
            Self::PoolStopped => write!(f, "{}: stopped contract", self.code()),
            Self::NothingDeposited { .. } => write!(f, "{}: nothing deposited", self.code()),
            Self::AlreadyInitialized => write!(f, "{}: already initialized", self.code()),
            Self::ValueMismatch { expected, actual } => {
                write!(f, "{}: expected {} got {}", self.code(), expected, actual)
            }
            Self::InvariantViolated { reason } => write!(f, "{}: {}", self.code(), reason),
            _ => f.write_str(self.code()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PoolError {}
