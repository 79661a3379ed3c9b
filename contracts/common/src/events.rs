//! Pool Events
//!
//! Events are emitted during ledger execution and can be indexed off-chain
//! for deposit history views, reward notifications and analytics.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::Address;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Lifecycle Events (0x01 - 0x1F)
    Initialized = 0x01,

    // Pool Events (0x20 - 0x3F)
    Deposit = 0x20,
    Reward = 0x21,
    Withdraw = 0x22,
}

/// All events the ledger can emit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolEvent {
    /// Emitted once when the owner is set
    Initialized {
        owner: Address,
        timestamp: u64,
    },

    /// Emitted when a participant deposits
    Deposit {
        participant: Address,
        amount: u64,
        timestamp: u64,
    },

    /// Emitted when the owner injects a reward
    Reward {
        amount: u64,
        timestamp: u64,
    },

    /// Emitted when a participant settles all open deposits
    Withdraw {
        participant: Address,
        deposited: u64,
        payout: u64,
        timestamp: u64,
    },
}

impl PoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Initialized { .. } => EventType::Initialized,
            Self::Deposit { .. } => EventType::Deposit,
            Self::Reward { .. } => EventType::Reward,
            Self::Withdraw { .. } => EventType::Withdraw,
        }
    }

    /// Get the time the event occurred
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Initialized { timestamp, .. }
            | Self::Deposit { timestamp, .. }
            | Self::Reward { timestamp, .. }
            | Self::Withdraw { timestamp, .. } => *timestamp,
        }
    }

    /// Participant the event concerns, if any
    pub fn participant(&self) -> Option<&Address> {
        match self {
            Self::Deposit { participant, .. } | Self::Withdraw { participant, .. } => Some(participant),
            _ => None,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> borsh::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Append every event from another log
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Get all events
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Remove and return all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<PoolEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&PoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events concerning one participant
    pub fn for_participant(&self, participant: &Address) -> Vec<&PoolEvent> {
        self.events
            .iter()
            .filter(|e| e.participant() == Some(participant))
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = PoolEvent::Withdraw {
            participant: [2u8; 32],
            deposited: 1_000,
            payout: 2_000,
            timestamp: 100,
        };

        assert_eq!(event.event_type(), EventType::Withdraw);
        assert_eq!(event.timestamp(), 100);
        assert_eq!(event.participant(), Some(&[2u8; 32]));
    }

    #[test]
    fn test_event_bytes() {
        let event = PoolEvent::Reward {
            amount: 3_000,
            timestamp: 200,
        };

        let restored = PoolEvent::from_bytes(&event.to_bytes().unwrap()).unwrap();
        assert_eq!(event, restored);
        assert!(PoolEvent::from_bytes(&[0xFF]).is_none());
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();

        log.emit(PoolEvent::Deposit {
            participant: [2u8; 32],
            amount: 1_000,
            timestamp: 100,
        });
        log.emit(PoolEvent::Deposit {
            participant: [3u8; 32],
            amount: 2_000,
            timestamp: 101,
        });
        log.emit(PoolEvent::Reward {
            amount: 3_000,
            timestamp: 102,
        });

        assert_eq!(log.len(), 3);
        assert!(log.has_events());
        assert_eq!(log.filter_by_type(EventType::Deposit).len(), 2);
        assert_eq!(log.for_participant(&[3u8; 32]).len(), 1);

        let drained = log.drain();
        assert_eq!(drained.len(), 3);
        assert!(log.is_empty());
    }
}
