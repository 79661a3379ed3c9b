//! ETHPool Reward Pool App
//!
//! Validates reward pool operations.
//! Participants deposit value and earn a pro-rata share of owner rewards.
//!
//! ## Validation Model
//!
//! This is a **validation function** over state transitions:
//! - The transaction carries the input pool state and a proposed output state
//! - The witness names the operation and the caller; the caller must also
//!   spend an output locked by a script hashing to that identity
//! - Value moved is the change in the coin amount held by the pool output
//! - The app re-executes the operation on the input state with the core
//!   ledger and accepts only if the result equals the proposed output and
//!   the value moved matches what the ledger owes

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;
pub mod witness;

use ethpool_common::{
    access_control::require_spent_by,
    errors::{PoolError, PoolResult},
    events::EventLog,
    ledger::{ActionOutcome, Ledger},
    types::{Address, PoolAction, PoolId, PoolState},
};

// ============ Pool Config ============

/// Configuration for a deployed pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// Pool address (see `ethpool_common::deployment`)
    pub pool_id: PoolId,
    /// Owner recorded at deployment
    pub owner: Address,
}

// ============ Validation Context ============

/// Context for validating pool operations
pub struct PoolContext {
    /// Current pool state
    pub state: PoolState,
    /// Proposed pool state
    pub new_state: PoolState,
    /// Config
    pub config: PoolConfig,
    /// Caller identity claimed by the witness
    pub signer: Address,
    /// Locking scripts of the outputs the transaction spends, pool output excluded
    pub spent_scripts: Vec<Vec<u8>>,
    /// Value the caller attaches to the pool
    pub value_in: u64,
    /// Value the pool releases to the caller
    pub value_out: u64,
    /// Current time
    pub timestamp: u64,
    /// Event log
    pub events: EventLog,
}

// ============ Validation Functions ============

/// Main validation entry point
///
/// Returns the ledger outcome so callers can inspect results.
pub fn validate(ctx: &mut PoolContext, action: &PoolAction) -> PoolResult<ActionOutcome> {
    // 0. Claimed caller must be backed by a spent output
    require_spent_by(&ctx.signer, ctx.spent_scripts.iter().map(Vec::as_slice))?;

    // 1. Initialization must name the deployed owner
    if let PoolAction::Initialize { owner } = action {
        if *owner != ctx.config.owner || ctx.signer != ctx.config.owner {
            return Err(PoolError::NotOwner { caller: ctx.signer });
        }
    }

    // 2. Attached value must match the operation
    let expected_in = action.attached_value();
    if ctx.value_in != expected_in {
        return Err(PoolError::ValueMismatch {
            expected: expected_in,
            actual: ctx.value_in,
        });
    }

    // 3. Re-execute on the input state
    let mut ledger = Ledger::from_state(ctx.state.clone());
    let outcome = ledger.apply(&ctx.signer, action, ctx.timestamp)?;

    // 4. Released value must match the payout
    let expected_out = outcome.value_out();
    if ctx.value_out != expected_out {
        return Err(PoolError::ValueMismatch {
            expected: expected_out,
            actual: ctx.value_out,
        });
    }

    // 5. Proposed state must match re-execution
    if ledger.state() != &ctx.new_state {
        return Err(PoolError::InvalidStateTransition);
    }

    // 6. Emit events
    ctx.events.extend(ledger.take_events());

    Ok(outcome)
}

// ============ Helper Functions ============

/// Value entering and leaving the pool, from the coin amount on the pool
/// output before and after the transaction
pub fn pool_value_flows(held_before: u64, held_after: u64) -> (u64, u64) {
    (
        held_after.saturating_sub(held_before),
        held_before.saturating_sub(held_after),
    )
}

/// Build the output state a client should propose for `action`
pub fn expected_state(
    state: &PoolState,
    signer: &Address,
    action: &PoolAction,
    timestamp: u64,
) -> PoolResult<(PoolState, ActionOutcome)> {
    let mut ledger = Ledger::from_state(state.clone());
    let outcome = ledger.apply(signer, action, timestamp)?;
    Ok((ledger.into_state(), outcome))
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use ethpool_common::{
        access_control::address_of_script,
        constants::units::ONE_FINNEY,
        deployment::derive_pool_address,
        events::{EventType, PoolEvent},
    };

    fn owner_script() -> Vec<u8> {
        b"owner-script".to_vec()
    }

    fn user_script() -> Vec<u8> {
        b"user-script".to_vec()
    }

    fn owner() -> Address {
        address_of_script(&owner_script())
    }

    fn user() -> Address {
        address_of_script(&user_script())
    }

    fn script_of(signer: &Address) -> Vec<u8> {
        if *signer == owner() {
            owner_script()
        } else {
            user_script()
        }
    }

    fn config() -> PoolConfig {
        PoolConfig {
            pool_id: derive_pool_address(&owner(), 0),
            owner: owner(),
        }
    }

    fn initialized_state() -> PoolState {
        let (state, _) = expected_state(
            &PoolState::new(),
            &owner(),
            &PoolAction::Initialize { owner: owner() },
            1,
        )
        .unwrap();
        state
    }

    fn create_test_context(state: PoolState, signer: Address) -> PoolContext {
        PoolContext {
            new_state: state.clone(),
            state,
            config: config(),
            signer,
            spent_scripts: vec![script_of(&signer)],
            value_in: 0,
            value_out: 0,
            timestamp: 100,
            events: EventLog::new(),
        }
    }

    #[test]
    fn test_initialize_success() {
        let mut ctx = create_test_context(PoolState::new(), owner());
        let action = PoolAction::Initialize { owner: owner() };
        ctx.new_state = expected_state(&ctx.state, &owner(), &action, 100).unwrap().0;

        let result = validate(&mut ctx, &action);

        assert!(result.is_ok(), "Should succeed: {:?}", result);
        assert_eq!(ctx.events.filter_by_type(EventType::Initialized).len(), 1);
    }

    #[test]
    fn test_unbacked_caller_rejected() {
        // Witness claims the owner but only the user's coin is spent
        let mut ctx = create_test_context(initialized_state(), owner());
        ctx.spent_scripts = vec![user_script()];
        ctx.new_state = expected_state(&ctx.state, &owner(), &PoolAction::ToggleStopped, 100)
            .unwrap()
            .0;

        assert_eq!(
            validate(&mut ctx, &PoolAction::ToggleStopped),
            Err(PoolError::UnverifiedCaller { caller: owner() })
        );

        ctx.spent_scripts.clear();
        assert_eq!(
            validate(&mut ctx, &PoolAction::ToggleStopped),
            Err(PoolError::UnverifiedCaller { caller: owner() })
        );
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_pool_value_flows() {
        assert_eq!(pool_value_flows(5_000, 6_000), (1_000, 0));
        assert_eq!(pool_value_flows(6_000, 4_500), (0, 1_500));
        assert_eq!(pool_value_flows(700, 700), (0, 0));
    }

    #[test]
    fn test_initialize_foreign_owner() {
        let mut ctx = create_test_context(PoolState::new(), user());
        let action = PoolAction::Initialize { owner: user() };

        let result = validate(&mut ctx, &action);
        assert_eq!(result, Err(PoolError::NotOwner { caller: user() }));
    }

    #[test]
    fn test_deposit_success() {
        let mut ctx = create_test_context(initialized_state(), user());
        let action = PoolAction::Deposit { amount: ONE_FINNEY };
        ctx.value_in = ONE_FINNEY;
        ctx.new_state = expected_state(&ctx.state, &user(), &action, 100).unwrap().0;

        let result = validate(&mut ctx, &action);

        assert!(result.is_ok(), "Should succeed: {:?}", result);
        assert_eq!(
            ctx.events.events(),
            &[PoolEvent::Deposit {
                participant: user(),
                amount: ONE_FINNEY,
                timestamp: 100,
            }]
        );
    }

    #[test]
    fn test_deposit_value_mismatch() {
        let mut ctx = create_test_context(initialized_state(), user());
        let action = PoolAction::Deposit { amount: ONE_FINNEY };
        ctx.value_in = ONE_FINNEY - 1;
        ctx.new_state = expected_state(&ctx.state, &user(), &action, 100).unwrap().0;

        assert_eq!(
            validate(&mut ctx, &action),
            Err(PoolError::ValueMismatch {
                expected: ONE_FINNEY,
                actual: ONE_FINNEY - 1,
            })
        );
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_forged_output_state() {
        let mut ctx = create_test_context(initialized_state(), user());
        let action = PoolAction::Deposit { amount: ONE_FINNEY };
        ctx.value_in = ONE_FINNEY;
        let mut forged = expected_state(&ctx.state, &user(), &action, 100).unwrap().0;
        forged.held_value += 1;
        ctx.new_state = forged;

        assert_eq!(validate(&mut ctx, &action), Err(PoolError::InvalidStateTransition));
    }

    #[test]
    fn test_withdraw_payout_checked() {
        let state = initialized_state();
        let (state, _) =
            expected_state(&state, &user(), &PoolAction::Deposit { amount: 10 }, 2).unwrap();
        let (state, _) =
            expected_state(&state, &owner(), &PoolAction::Reward { amount: 5 }, 3).unwrap();

        // Underpaid withdrawal rejected
        let mut ctx = create_test_context(state.clone(), user());
        ctx.new_state = expected_state(&state, &user(), &PoolAction::Withdraw, 100).unwrap().0;
        ctx.value_out = 10;
        assert_eq!(
            validate(&mut ctx, &PoolAction::Withdraw),
            Err(PoolError::ValueMismatch { expected: 15, actual: 10 })
        );

        // Exact payout accepted
        ctx.value_out = 15;
        let outcome = validate(&mut ctx, &PoolAction::Withdraw).unwrap();
        assert_eq!(outcome.value_out(), 15);
    }

    #[test]
    fn test_ledger_errors_propagate() {
        let mut ctx = create_test_context(initialized_state(), user());
        ctx.value_in = 5;

        assert_eq!(
            validate(&mut ctx, &PoolAction::Reward { amount: 5 }),
            Err(PoolError::NotOwner { caller: user() })
        );

        let mut ctx = create_test_context(initialized_state(), user());
        assert_eq!(
            validate(&mut ctx, &PoolAction::Withdraw),
            Err(PoolError::NothingDeposited { participant: user() })
        );
    }

    #[test]
    fn test_toggle_moves_no_value() {
        let mut ctx = create_test_context(initialized_state(), owner());
        ctx.value_in = 1;

        assert_eq!(
            validate(&mut ctx, &PoolAction::ToggleStopped),
            Err(PoolError::ValueMismatch { expected: 0, actual: 1 })
        );

        ctx.value_in = 0;
        ctx.new_state = expected_state(&ctx.state, &owner(), &PoolAction::ToggleStopped, 100)
            .unwrap()
            .0;
        assert!(validate(&mut ctx, &PoolAction::ToggleStopped).is_ok());
        assert!(ctx.new_state.stopped);
    }
}
