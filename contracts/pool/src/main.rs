//! ETHPool Reward Pool - Charms App Entry Point
//!
//! Validates reward pool operations on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **Initialize**: Creates the empty pool state for the deployed owner
//! - **Deposit**: Participant moves value into the pool
//! - **Reward**: Owner injects value spread over open deposits
//! - **Withdraw**: Participant receives principal plus accrued rewards
//! - **ToggleStopped**: Owner pauses or resumes deposits and rewards

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for pool operations.
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    ethpool_pool::charms::validate_pool_operation(app, tx, x, w)
}

// Use the Charms SDK main macro to generate the entry point
charms_sdk::main!(app_contract);
