//! Witness Encoding
//!
//! A witness names the operation a transaction performs. It travels as
//! CBOR, the encoding Charms uses for app data.

use ethpool_common::{
    errors::{PoolError, PoolResult},
    types::{Address, PoolAction},
};
use serde::{Deserialize, Serialize};

// ============ Operation Codes ============

/// Operation codes for pool actions (encoded in witness)
pub mod op {
    /// One-time initialization with the owner identity
    pub const INITIALIZE: u8 = 0x00;
    /// Participant deposit
    pub const DEPOSIT: u8 = 0x30;
    /// Owner reward injection
    pub const REWARD: u8 = 0x31;
    /// Participant withdrawal of all open deposits
    pub const WITHDRAW: u8 = 0x32;
    /// Owner pause toggle
    pub const TOGGLE_STOPPED: u8 = 0x33;
}

// ============ Witness Structures ============

/// Witness data for pool operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Identity performing the operation
    pub caller: Address,
    /// Amount for deposit/reward
    pub amount: Option<u64>,
    /// Owner for initialize
    pub owner: Option<Address>,
    /// Time supplied by the environment
    pub timestamp: Option<u64>,
}

impl PoolWitness {
    /// Create witness for initialize
    pub fn initialize(owner: Address) -> Self {
        Self {
            op: op::INITIALIZE,
            caller: owner,
            amount: None,
            owner: Some(owner),
            timestamp: None,
        }
    }

    /// Create witness for a deposit
    pub fn deposit(caller: Address, amount: u64) -> Self {
        Self {
            op: op::DEPOSIT,
            caller,
            amount: Some(amount),
            owner: None,
            timestamp: None,
        }
    }

    /// Create witness for a reward injection
    pub fn reward(caller: Address, amount: u64) -> Self {
        Self {
            op: op::REWARD,
            caller,
            amount: Some(amount),
            owner: None,
            timestamp: None,
        }
    }

    /// Create witness for a withdrawal
    pub fn withdraw(caller: Address) -> Self {
        Self {
            op: op::WITHDRAW,
            caller,
            amount: None,
            owner: None,
            timestamp: None,
        }
    }

    /// Create witness for the pause toggle
    pub fn toggle_stopped(caller: Address) -> Self {
        Self {
            op: op::TOGGLE_STOPPED,
            caller,
            amount: None,
            owner: None,
            timestamp: None,
        }
    }

    /// Attach the environment time
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Encode as CBOR
    pub fn to_cbor(&self) -> PoolResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes).map_err(|_| PoolError::InvalidWitness)?;
        Ok(bytes)
    }

    /// Decode from CBOR
    pub fn from_cbor(bytes: &[u8]) -> PoolResult<Self> {
        ciborium::from_reader(bytes).map_err(|_| PoolError::InvalidWitness)
    }
}

/// Convert a witness into the action it encodes
pub fn witness_to_action(w: &PoolWitness) -> Option<PoolAction> {
    match w.op {
        op::INITIALIZE => Some(PoolAction::Initialize { owner: w.owner? }),
        op::DEPOSIT => Some(PoolAction::Deposit { amount: w.amount? }),
        op::REWARD => Some(PoolAction::Reward { amount: w.amount? }),
        op::WITHDRAW => Some(PoolAction::Withdraw),
        op::TOGGLE_STOPPED => Some(PoolAction::ToggleStopped),
        _ => None,
    }
}

/// Decode CBOR bytes straight into `(caller, action, timestamp)`
pub fn decode_action(bytes: &[u8]) -> PoolResult<(Address, PoolAction, u64)> {
    let witness = PoolWitness::from_cbor(bytes)?;
    let action = witness_to_action(&witness).ok_or(PoolError::InvalidWitness)?;
    Ok((witness.caller, action, witness.timestamp.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_witness_to_action() {
        let action = witness_to_action(&PoolWitness::deposit([2u8; 32], 1_000)).unwrap();
        assert_eq!(action, PoolAction::Deposit { amount: 1_000 });

        let action = witness_to_action(&PoolWitness::initialize([1u8; 32])).unwrap();
        assert_eq!(action, PoolAction::Initialize { owner: [1u8; 32] });

        assert_eq!(
            witness_to_action(&PoolWitness::toggle_stopped([1u8; 32])),
            Some(PoolAction::ToggleStopped)
        );
    }

    #[test]
    fn test_witness_missing_fields() {
        let mut witness = PoolWitness::reward([1u8; 32], 5);
        witness.amount = None;
        assert_eq!(witness_to_action(&witness), None);

        let mut witness = PoolWitness::withdraw([2u8; 32]);
        witness.op = 0x7F;
        assert_eq!(witness_to_action(&witness), None);
    }

    #[test]
    fn test_decode_action_from_cbor() {
        let bytes = PoolWitness::withdraw([2u8; 32]).at(1_700).to_cbor().unwrap();
        let (caller, action, timestamp) = decode_action(&bytes).unwrap();

        assert_eq!(caller, [2u8; 32]);
        assert_eq!(action, PoolAction::Withdraw);
        assert_eq!(timestamp, 1_700);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_action(&[0xFF, 0x00]), Err(PoolError::InvalidWitness));

        let mut unknown = PoolWitness::withdraw([2u8; 32]);
        unknown.op = 0x99;
        let bytes = unknown.to_cbor().unwrap();
        assert_eq!(decode_action(&bytes), Err(PoolError::InvalidWitness));
    }
}
