//! ETHPool Common Library
//!
//! Core ledger for the ETHPool reward pool.
//!
//! Participants deposit value, the owner periodically injects rewards, and
//! each participant withdraws their deposit plus a pro-rata share of every
//! reward issued while that deposit was outstanding.
//!
//! ## Execution Model
//!
//! The ledger is a plain state machine. It assumes the surrounding
//! environment provides:
//! - **Serialized execution**: one operation completes before the next begins
//! - **Verified caller identity**: the `Address` passed to each operation
//! - **Attached value and time**: deposit/reward amounts and a timestamp
//!
//! Every operation validates before it mutates, so a rejected call leaves
//! the state untouched.
//!
//! ## Modules
//!
//! - **Ledger**: deposit accounting, reward index, withdrawal settlement
//! - **Math**: fixed-point reward index arithmetic
//! - **Access Control**: owner/participant/initialization guards
//! - **Events**: typed events for indexers and UIs
//! - **Deployment**: pool address derivation and deployment artifacts
//!
//! This crate is `no_std` compatible when the `std` feature is disabled.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod access_control;
pub mod ledger;
pub mod deployment;


// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use access_control::*;
pub use ledger::*;
pub use deployment::*;
