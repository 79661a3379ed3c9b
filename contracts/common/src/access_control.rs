//! Access Control Module
//!
//! Guards shared by every mutating ledger operation. Each guard inspects
//! the state only; none of them mutate.
//!
//! Roles:
//! - **Owner**: injects rewards and pauses the pool
//! - **Participant**: any non-owner identity; deposits and withdraws
//!
//! An identity is the hash of a locking script. A caller proves it by
//! spending an output locked by that script in the same transaction.

use sha2::{Digest, Sha256};

use crate::constants::addresses::ZERO;
use crate::types::{Address, PoolState};
use crate::{PoolError, PoolResult};

/// Domain separator for script identities
const SCRIPT_ADDRESS_DOMAIN: &[u8] = b"ethpool/script-address/v1";

/// Role of a caller relative to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The pool administrator
    Owner,
    /// Anyone else
    Participant,
}

/// Resolve the caller's role
pub fn role_of(state: &PoolState, caller: &Address) -> Role {
    if state.initialized && &state.owner == caller {
        Role::Owner
    } else {
        Role::Participant
    }
}

/// Fail unless `initialize` has run
pub fn require_initialized(state: &PoolState) -> PoolResult<()> {
    if !state.initialized {
        return Err(PoolError::NotInitialized);
    }
    Ok(())
}

/// Fail if `initialize` already ran
pub fn require_uninitialized(state: &PoolState) -> PoolResult<()> {
    if state.initialized {
        return Err(PoolError::AlreadyInitialized);
    }
    Ok(())
}

/// Fail unless the caller is the owner
pub fn require_owner(state: &PoolState, caller: &Address) -> PoolResult<()> {
    match role_of(state, caller) {
        Role::Owner => Ok(()),
        Role::Participant => Err(PoolError::NotOwner { caller: *caller }),
    }
}

/// Fail if the caller is the owner
pub fn require_participant(state: &PoolState, caller: &Address) -> PoolResult<()> {
    match role_of(state, caller) {
        Role::Participant => Ok(()),
        Role::Owner => Err(PoolError::NotAParticipant { caller: *caller }),
    }
}

/// Fail while the pool is stopped
pub fn require_running(state: &PoolState) -> PoolResult<()> {
    if state.stopped {
        return Err(PoolError::PoolStopped);
    }
    Ok(())
}

/// Reject the reserved zero address as an identity
pub fn require_valid_address(address: &Address) -> PoolResult<()> {
    if *address == ZERO {
        return Err(PoolError::InvalidAddress {
            reason: "zero address cannot hold a role",
        });
    }
    Ok(())
}

/// Identity controlled by whoever can spend outputs locked by `script`
pub fn address_of_script(script: &[u8]) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(SCRIPT_ADDRESS_DOMAIN);
    hasher.update(script);
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

/// Fail unless one of the spent scripts belongs to the caller
pub fn require_spent_by<'a, I>(caller: &Address, spent_scripts: I) -> PoolResult<()>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    if spent_scripts
        .into_iter()
        .any(|script| &address_of_script(script) == caller)
    {
        Ok(())
    } else {
        Err(PoolError::UnverifiedCaller { caller: *caller })
    }
}
