//! Charms SDK Integration for the ETHPool Reward Pool
//!
//! Bridges Charms transactions to the pool validation logic.
//!
//! ```text
//! Initialize:
//!   IN:  [PoolConfig (ref), owner coin]
//!   OUT: [PoolState (initialized, empty) + reserve]
//!
//! Deposit / Reward:
//!   IN:  [PoolState + held, caller coin]
//!   OUT: [PoolState (updated) + held + amount, change]
//!
//! Withdraw:
//!   IN:  [PoolState + held, caller coin]
//!   OUT: [PoolState (records settled) + held - payout, caller payout]
//!
//! ToggleStopped:
//!   IN:  [PoolState + held, owner coin]
//!   OUT: [PoolState (flag flipped) + held]
//! ```
//!
//! The pool state charm holds the whole ledger; every operation spends it
//! and recreates it, so Bitcoin's single-use outputs serialize operations.
//! The coin amount on the pool output is the value the pool holds: a deposit
//! or reward raises it by the attached amount, a withdrawal lowers it by the
//! payout. The amount locked at initialization is a reserve outside the
//! ledger.
//!
//! The caller named in the witness must spend at least one other output
//! whose locking script hashes to that identity.

use charms_data::{App, Data, Transaction};
use crate::{
    pool_value_flows, validate,
    witness::{witness_to_action, PoolWitness},
    PoolConfig, PoolContext,
};
use ethpool_common::{
    events::EventLog,
    types::{PoolAction, PoolState},
};

// ============ Main Validation Function ============

/// Validates a pool operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The pool app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused)
/// * `w` - Witness data (operation, caller, amount)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_pool_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
    // 1. Parse witness
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    // 2. Convert to action
    let action = match witness_to_action(&witness) {
        Some(a) => a,
        None => return false,
    };

    // 3. Config from reference inputs
    let config = match extract_config(tx) {
        Some(c) => c,
        None => return false,
    };

    // 4. Pool states (initialize starts from an empty state)
    let input = extract_input_state(app, tx);
    let (input_index, state) = match input {
        Some((i, s)) => (Some(i), s),
        None if matches!(action, PoolAction::Initialize { .. }) => (None, PoolState::new()),
        None => return false,
    };
    let (output_index, new_state) = match extract_output_state(app, tx) {
        Some(found) => found,
        None => return false,
    };

    // 5. Value flows on the pool output
    let held_after = coin_out_amount(tx, output_index);
    let held_before = match input_index {
        Some(i) => coin_in_amount(tx, i),
        None => held_after,
    };
    let (value_in, value_out) = pool_value_flows(held_before, held_after);

    // 6. Build validation context
    let mut ctx = PoolContext {
        state,
        new_state,
        config,
        signer: witness.caller,
        spent_scripts: spent_scripts(tx, input_index),
        value_in,
        value_out,
        timestamp: witness.timestamp.unwrap_or(0),
        events: EventLog::new(),
    };

    // 7. Run validation
    validate(&mut ctx, &action).is_ok()
}

// ============ Parsing Functions ============

/// Parse witness data
fn parse_witness(w: &Data) -> Option<PoolWitness> {
    w.value::<PoolWitness>().ok()
}

// ============ State Extraction ============

/// Extract pool configuration from reference inputs
fn extract_config(tx: &Transaction) -> Option<PoolConfig> {
    for (_, charms) in tx.refs.iter() {
        for (_, data) in charms.iter() {
            if let Ok(config) = data.value::<PoolConfig>() {
                return Some(config);
            }
        }
    }
    None
}

/// Pool state being spent, with its input position
fn extract_input_state(app: &App, tx: &Transaction) -> Option<(usize, PoolState)> {
    tx.ins.iter().enumerate().find_map(|(i, (_, charms))| {
        charms
            .get(app)
            .and_then(|data| data.value::<PoolState>().ok())
            .map(|state| (i, state))
    })
}

/// Pool state being created, with its output position
fn extract_output_state(app: &App, tx: &Transaction) -> Option<(usize, PoolState)> {
    tx.outs.iter().enumerate().find_map(|(i, charms)| {
        charms
            .get(app)
            .and_then(|data| data.value::<PoolState>().ok())
            .map(|state| (i, state))
    })
}

// ============ Flow Calculations ============

/// Coin amount on input `index`
fn coin_in_amount(tx: &Transaction, index: usize) -> u64 {
    tx.coin_ins
        .as_ref()
        .and_then(|ins| ins.get(index))
        .map(|o| o.amount)
        .unwrap_or(0)
}

/// Coin amount on output `index`
fn coin_out_amount(tx: &Transaction, index: usize) -> u64 {
    tx.coin_outs
        .as_ref()
        .and_then(|outs| outs.get(index))
        .map(|o| o.amount)
        .unwrap_or(0)
}

// ============ Caller Proof ============

/// Locking scripts of every spent coin except the pool's own
fn spent_scripts(tx: &Transaction, pool_input: Option<usize>) -> Vec<Vec<u8>> {
    tx.coin_ins
        .as_ref()
        .map(|ins| {
            ins.iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != pool_input)
                .map(|(_, o)| o.dest.clone())
                .collect()
        })
        .unwrap_or_default()
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use charms_data::{NativeOutput, TxId, UtxoId, B32};
    use ethpool_common::{access_control::address_of_script, deployment::derive_pool_address};
    use std::collections::BTreeMap;

    const POOL_SCRIPT: &[u8] = b"pool-script";
    const OWNER_SCRIPT: &[u8] = b"owner-script";
    const USER_SCRIPT: &[u8] = b"user-script";

    fn create_test_app() -> App {
        App {
            tag: 'n',
            identity: B32([9u8; 32]),
            vk: B32([0u8; 32]),
        }
    }

    fn config_app() -> App {
        App {
            tag: 'n',
            identity: B32([8u8; 32]),
            vk: B32([0u8; 32]),
        }
    }

    fn owner() -> [u8; 32] {
        address_of_script(OWNER_SCRIPT)
    }

    fn user() -> [u8; 32] {
        address_of_script(USER_SCRIPT)
    }

    fn utxo(n: u8) -> UtxoId {
        UtxoId(TxId([n; 32]), 0)
    }

    fn coin(amount: u64, dest: &[u8]) -> NativeOutput {
        NativeOutput {
            amount,
            dest: dest.to_vec(),
        }
    }

    fn charms_with<T: serde::Serialize>(app: App, value: &T) -> BTreeMap<App, Data> {
        let mut charms = BTreeMap::new();
        charms.insert(app, Data::from(value));
        charms
    }

    fn config_ref() -> (UtxoId, BTreeMap<App, Data>) {
        let config = PoolConfig {
            pool_id: derive_pool_address(&owner(), 0),
            owner: owner(),
        };
        (utxo(7), charms_with(config_app(), &config))
    }

    /// Pool output spent by the caller's coin, recreated next to change
    fn create_pool_tx(
        state: &PoolState,
        new_state: &PoolState,
        pool_before: u64,
        pool_after: u64,
        caller_script: &[u8],
    ) -> Transaction {
        let app = create_test_app();
        Transaction {
            ins: vec![
                (utxo(1), charms_with(app.clone(), state)),
                (utxo(2), BTreeMap::new()),
            ],
            refs: vec![config_ref()],
            outs: vec![charms_with(app, new_state), BTreeMap::new()],
            coin_ins: Some(vec![coin(pool_before, POOL_SCRIPT), coin(10_000, caller_script)]),
            coin_outs: Some(vec![coin(pool_after, POOL_SCRIPT), coin(8_900, caller_script)]),
            prev_txs: BTreeMap::new(),
            app_public_inputs: BTreeMap::new(),
        }
    }

    fn no_public_inputs() -> Data {
        Data::from(&0u64)
    }

    fn active_state() -> PoolState {
        crate::expected_state(
            &PoolState::new(),
            &owner(),
            &PoolAction::Initialize { owner: owner() },
            1,
        )
        .unwrap()
        .0
    }

    #[test]
    fn test_witness_from_data() {
        let witness = PoolWitness::deposit([2u8; 32], 1_000);
        let data = Data::from(&witness);
        let parsed = parse_witness(&data).unwrap();

        assert_eq!(parsed, witness);
        assert_eq!(
            witness_to_action(&parsed),
            Some(PoolAction::Deposit { amount: 1_000 })
        );
    }

    #[test]
    fn test_deposit_transaction() {
        let state = active_state();
        let action = PoolAction::Deposit { amount: 1_000 };
        let (new_state, _) = crate::expected_state(&state, &user(), &action, 50).unwrap();

        // Pool output grows by the deposit; the rest is change and fee
        let tx = create_pool_tx(&state, &new_state, 5_000, 6_000, USER_SCRIPT);
        let w = Data::from(&PoolWitness::deposit(user(), 1_000).at(50));
        assert!(validate_pool_operation(&create_test_app(), &tx, &no_public_inputs(), &w));

        // Deposit value burned as fee instead of reaching the pool
        let tx = create_pool_tx(&state, &new_state, 5_000, 5_000, USER_SCRIPT);
        assert!(!validate_pool_operation(&create_test_app(), &tx, &no_public_inputs(), &w));
    }

    #[test]
    fn test_withdraw_transaction() {
        let state = active_state();
        let (state, _) =
            crate::expected_state(&state, &user(), &PoolAction::Deposit { amount: 1_000 }, 2)
                .unwrap();
        let (state, _) =
            crate::expected_state(&state, &owner(), &PoolAction::Reward { amount: 500 }, 3)
                .unwrap();
        let (new_state, outcome) =
            crate::expected_state(&state, &user(), &PoolAction::Withdraw, 4).unwrap();
        assert_eq!(outcome.value_out(), 1_500);

        let w = Data::from(&PoolWitness::withdraw(user()).at(4));

        let tx = create_pool_tx(&state, &new_state, 7_000, 5_500, USER_SCRIPT);
        assert!(validate_pool_operation(&create_test_app(), &tx, &no_public_inputs(), &w));

        // Pool output shrinks by more than the payout
        let tx = create_pool_tx(&state, &new_state, 7_000, 5_000, USER_SCRIPT);
        assert!(!validate_pool_operation(&create_test_app(), &tx, &no_public_inputs(), &w));
    }

    #[test]
    fn test_claimed_caller_must_spend() {
        let state = active_state();
        let (new_state, _) =
            crate::expected_state(&state, &owner(), &PoolAction::ToggleStopped, 5).unwrap();

        let w = Data::from(&PoolWitness::toggle_stopped(owner()).at(5));

        // Only the user's coin is spent
        let tx = create_pool_tx(&state, &new_state, 5_000, 5_000, USER_SCRIPT);
        assert!(!validate_pool_operation(&create_test_app(), &tx, &no_public_inputs(), &w));

        let tx = create_pool_tx(&state, &new_state, 5_000, 5_000, OWNER_SCRIPT);
        assert!(validate_pool_operation(&create_test_app(), &tx, &no_public_inputs(), &w));
    }

    #[test]
    fn test_pool_coin_is_not_a_caller_proof() {
        let state = active_state();
        let (new_state, _) =
            crate::expected_state(&state, &owner(), &PoolAction::ToggleStopped, 5).unwrap();
        let tx = create_pool_tx(&state, &new_state, 5_000, 5_000, USER_SCRIPT);

        assert_eq!(spent_scripts(&tx, Some(0)), vec![USER_SCRIPT.to_vec()]);
        assert_eq!(spent_scripts(&tx, None).len(), 2);
    }
}
