//! Protocol Constants
//!
//! Pool metadata, value units and fixed-point precision.

/// Pool Metadata
pub mod pool {
    /// Pool name reported to clients
    pub const NAME: &str = "ETHPool";
    /// Ledger version
    pub const VERSION: &str = "1.0.0";
}

/// Value units (minimal unit = 1 wei)
pub mod units {
    /// 1 ether in wei
    pub const ONE_ETHER: u64 = 1_000_000_000_000_000_000;
    /// 1 finney (0.001 ether) in wei
    pub const ONE_FINNEY: u64 = 1_000_000_000_000_000;
}

/// Reward index precision
pub mod precision {
    /// Fixed-point scale for the reward index (2^64)
    ///
    /// Exceeds any `u64` outstanding total, so dividing a reward by the
    /// outstanding total loses less than one wei.
    pub const SCALE_FACTOR: u128 = 1 << 64;
}

/// Reserved addresses
pub mod addresses {
    use crate::types::Address;

    /// The all-zero address never identifies a caller
    pub const ZERO: Address = [0u8; 32];
}
