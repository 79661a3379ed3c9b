//! Deployment Artifacts
//!
//! At provisioning time the deployer records where the pool lives and who
//! owns it. Clients read this record to know which identity may inject
//! rewards and toggle the pool.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::access_control::require_valid_address;
use crate::types::{Address, PoolId};
use crate::PoolResult;

/// Domain separator for pool address derivation
const POOL_ADDRESS_DOMAIN: &[u8] = b"ethpool/pool-address/v1";

/// Pool address and owner, as persisted for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DeploymentRecord {
    /// Address of the deployed pool
    pub address: PoolId,
    /// Owner identity passed to `initialize`
    pub owner: Address,
}

impl DeploymentRecord {
    /// Build the record for a new deployment, deriving the pool address
    pub fn new(owner: Address, nonce: u64) -> PoolResult<Self> {
        require_valid_address(&owner)?;
        Ok(Self {
            address: derive_pool_address(&owner, nonce),
            owner,
        })
    }

    /// Pretty JSON, as written next to the client bundle
    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a record written by `to_json`
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Generate a deterministic pool address
pub fn derive_pool_address(owner: &Address, nonce: u64) -> PoolId {
    let mut hasher = Sha256::new();
    hasher.update(POOL_ADDRESS_DOMAIN);
    hasher.update(owner);
    hasher.update(nonce.to_le_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}
