//! Core Types for the ETHPool Ledger
//!
//! Data structures shared by the ledger, the pool app and clients.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for participant/owner identities (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for pool identifiers
pub type PoolId = [u8; 32];

// ============ Deposit Types ============

/// One deposit in the pool history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositRecord {
    /// Depositor's address
    pub participant: Address,
    /// Deposited value (wei)
    pub amount: u64,
    /// Time of deposit
    pub timestamp: u64,
    /// True once principal and reward share have been paid out
    pub settled: bool,
    /// Reward index at deposit time
    pub index_snapshot: u128,
}

impl DepositRecord {
    /// Returns true if the record still counts toward the outstanding total
    pub fn is_outstanding(&self) -> bool {
        !self.settled
    }

    /// Returns true if this record belongs to `participant` and is unsettled
    pub fn is_open_for(&self, participant: &Address) -> bool {
        !self.settled && &self.participant == participant
    }
}

/// Last reward injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RewardData {
    /// Amount injected
    pub amount: u64,
    /// Time of injection
    pub time: u64,
}

// ============ Pool State ============

/// Lifecycle status of the pool, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolStatus {
    /// `initialize` has not been called
    Uninitialized,
    /// Accepting deposits and rewards
    Active,
    /// Owner paused deposits and rewards
    Stopped,
}

/// Persistent ledger state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolState {
    /// Administrator identity, fixed at initialization
    pub owner: Address,
    /// Set exactly once by `initialize`
    pub initialized: bool,
    /// Owner-controlled pause flag
    pub stopped: bool,
    /// Every deposit ever made, in chronological order
    pub history: Vec<DepositRecord>,
    /// Sum of `amount` over unsettled records
    pub total_outstanding: u64,
    /// Last reward injection
    pub reward_data: RewardData,
    /// Cumulative reward per unit of outstanding deposit, scaled by `SCALE_FACTOR`
    pub reward_index: u128,
    /// Remainder of the last index division, in `SCALE_FACTOR` units
    pub index_carry: u128,
    /// Value currently held by the pool
    pub held_value: u64,
    /// Rewards injected while nothing was outstanding
    pub absorbed_rewards: u64,
}

impl PoolState {
    /// Creates an uninitialized pool state
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the lifecycle status
    pub fn status(&self) -> PoolStatus {
        match (self.initialized, self.stopped) {
            (false, _) => PoolStatus::Uninitialized,
            (true, false) => PoolStatus::Active,
            (true, true) => PoolStatus::Stopped,
        }
    }
}

// ============ Actions ============

/// Mutating operations on the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// One-time setup with the owner identity
    Initialize { owner: Address },
    /// Participant deposits value
    Deposit { amount: u64 },
    /// Owner injects a reward
    Reward { amount: u64 },
    /// Participant settles all open deposits
    Withdraw,
    /// Owner pauses or resumes the pool
    ToggleStopped,
}

impl PoolAction {
    /// Value the caller must attach to the operation
    pub fn attached_value(&self) -> u64 {
        match self {
            Self::Deposit { amount } | Self::Reward { amount } => *amount,
            _ => 0,
        }
    }
}
