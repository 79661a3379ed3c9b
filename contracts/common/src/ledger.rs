//! Reward Pool Ledger
//!
//! The state machine behind ETHPool. Participants deposit value, the owner
//! injects rewards, and a withdrawal pays each open deposit its principal
//! plus its share of every reward issued while it was outstanding.
//!
//! ## Key Features
//!
//! - **Lazy Accrual**: one global reward index, one snapshot per deposit
//! - **Atomic Calls**: every guard and computation runs before the first write
//! - **Permanent History**: records are appended and settled, never removed
//! - **Owner Controls**: reward injection and pause toggle
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Active <--toggle_stopped--> Stopped
//! ```
//!
//! A stopped pool rejects deposits and rewards; withdrawals and reads keep
//! working.

use crate::access_control::{
    require_initialized, require_owner, require_participant, require_running,
    require_uninitialized, require_valid_address,
};
use crate::constants::pool;
use crate::events::{EventLog, PoolEvent};
use crate::math::{advance_index, safe_add, safe_sub, settlement_value};
use crate::types::{Address, DepositRecord, PoolAction, PoolState, PoolStatus, RewardData};
use crate::{PoolError, PoolResult, Vec};

// ============================================================================
// Operation Results
// ============================================================================

/// Result of a deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositResult {
    /// Position of the new record in the history
    pub record_index: usize,
    /// Outstanding total after the deposit
    pub new_total_outstanding: u64,
}

/// Result of a reward injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardResult {
    /// False when nothing was outstanding and the reward was absorbed
    pub distributed: bool,
    /// Reward index after the injection
    pub new_index: u128,
}

/// Result of a withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawResult {
    /// Sum of the settled principals
    pub deposited: u64,
    /// Principal plus accrued rewards, owed to the caller
    pub payout: u64,
    /// Number of records settled
    pub records_settled: usize,
}

/// Result of any action, as returned by [`Ledger::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Initialized,
    Deposited(DepositResult),
    Rewarded(RewardResult),
    Withdrawn(WithdrawResult),
    StoppedToggled { stopped: bool },
}

impl ActionOutcome {
    /// Value the pool pays out as a result of the action
    pub fn value_out(&self) -> u64 {
        match self {
            Self::Withdrawn(result) => result.payout,
            _ => 0,
        }
    }
}

// ============================================================================
// Ledger
// ============================================================================

/// Ledger state plus the events emitted by operations on it
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: PoolState,
    events: EventLog,
}

impl Ledger {
    /// Create an uninitialized ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted state
    pub fn from_state(state: PoolState) -> Self {
        Self {
            state,
            events: EventLog::new(),
        }
    }

    /// Borrow the persistent state
    pub fn state(&self) -> &PoolState {
        &self.state
    }

    /// Consume the ledger, returning the persistent state
    pub fn into_state(self) -> PoolState {
        self.state
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Take the emitted events
    pub fn take_events(&mut self) -> EventLog {
        core::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------------

    /// Dispatch an action on behalf of `caller`
    pub fn apply(&mut self, caller: &Address, action: &PoolAction, now: u64) -> PoolResult<ActionOutcome> {
        match action {
            PoolAction::Initialize { owner } => {
                self.initialize(owner, now).map(|_| ActionOutcome::Initialized)
            }
            PoolAction::Deposit { amount } => {
                self.deposit(caller, *amount, now).map(ActionOutcome::Deposited)
            }
            PoolAction::Reward { amount } => {
                self.reward(caller, *amount, now).map(ActionOutcome::Rewarded)
            }
            PoolAction::Withdraw => self.withdraw(caller, now).map(ActionOutcome::Withdrawn),
            PoolAction::ToggleStopped => self
                .toggle_stopped(caller)
                .map(|stopped| ActionOutcome::StoppedToggled { stopped }),
        }
    }

    /// One-time setup
    pub fn initialize(&mut self, owner: &Address, now: u64) -> PoolResult<()> {
        require_uninitialized(&self.state)?;
        require_valid_address(owner)?;

        self.state = PoolState {
            owner: *owner,
            initialized: true,
            ..PoolState::new()
        };

        self.events.emit(PoolEvent::Initialized {
            owner: *owner,
            timestamp: now,
        });

        Ok(())
    }

    /// Record a participant deposit of `amount`
    pub fn deposit(&mut self, caller: &Address, amount: u64, now: u64) -> PoolResult<DepositResult> {
        require_initialized(&self.state)?;
        require_participant(&self.state, caller)?;
        require_running(&self.state)?;
        if amount == 0 {
            return Err(PoolError::ZeroAmount);
        }

        let new_total = safe_add(self.state.total_outstanding, amount)?;
        let new_held = safe_add(self.state.held_value, amount)?;

        let record_index = self.state.history.len();
        self.state.history.push(DepositRecord {
            participant: *caller,
            amount,
            timestamp: now,
            settled: false,
            index_snapshot: self.state.reward_index,
        });
        self.state.total_outstanding = new_total;
        self.state.held_value = new_held;

        self.events.emit(PoolEvent::Deposit {
            participant: *caller,
            amount,
            timestamp: now,
        });

        Ok(DepositResult {
            record_index,
            new_total_outstanding: new_total,
        })
    }

    /// Inject a reward, spread pro rata over every open deposit
    ///
    /// With nothing outstanding the reward is absorbed: held and recorded,
    /// but owed to nobody.
    pub fn reward(&mut self, caller: &Address, amount: u64, now: u64) -> PoolResult<RewardResult> {
        require_initialized(&self.state)?;
        require_owner(&self.state, caller)?;
        require_running(&self.state)?;
        if amount == 0 {
            return Err(PoolError::ZeroAmount);
        }

        let outstanding = self.state.total_outstanding;
        let (new_index, new_carry) = advance_index(
            self.state.reward_index,
            self.state.index_carry,
            amount,
            outstanding,
        )?;
        let new_held = safe_add(self.state.held_value, amount)?;
        let distributed = outstanding > 0;
        let new_absorbed = if distributed {
            self.state.absorbed_rewards
        } else {
            safe_add(self.state.absorbed_rewards, amount)?
        };

        self.state.reward_index = new_index;
        self.state.index_carry = new_carry;
        self.state.held_value = new_held;
        self.state.absorbed_rewards = new_absorbed;
        self.state.reward_data = RewardData { amount, time: now };

        self.events.emit(PoolEvent::Reward {
            amount,
            timestamp: now,
        });

        Ok(RewardResult {
            distributed,
            new_index,
        })
    }

    /// Settle every open deposit of `caller`
    ///
    /// The returned payout is owed to the caller; transferring it is the
    /// environment's job.
    pub fn withdraw(&mut self, caller: &Address, now: u64) -> PoolResult<WithdrawResult> {
        require_initialized(&self.state)?;
        require_participant(&self.state, caller)?;

        let index_now = self.state.reward_index;
        let mut open = Vec::new();
        let mut deposited: u64 = 0;
        let mut payout: u64 = 0;

        for (i, record) in self.state.history.iter().enumerate() {
            if record.is_open_for(caller) {
                deposited = safe_add(deposited, record.amount)?;
                payout = safe_add(
                    payout,
                    settlement_value(record.amount, record.index_snapshot, index_now)?,
                )?;
                open.push(i);
            }
        }

        if open.is_empty() {
            return Err(PoolError::NothingDeposited { participant: *caller });
        }

        let new_total = safe_sub(self.state.total_outstanding, deposited)?;
        let new_held = safe_sub(self.state.held_value, payout)?;

        for &i in &open {
            self.state.history[i].settled = true;
        }
        self.state.total_outstanding = new_total;
        self.state.held_value = new_held;

        self.events.emit(PoolEvent::Withdraw {
            participant: *caller,
            deposited,
            payout,
            timestamp: now,
        });

        Ok(WithdrawResult {
            deposited,
            payout,
            records_settled: open.len(),
        })
    }

    /// Flip the pause flag; returns the new value
    pub fn toggle_stopped(&mut self, caller: &Address) -> PoolResult<bool> {
        require_initialized(&self.state)?;
        require_owner(&self.state, caller)?;

        self.state.stopped = !self.state.stopped;
        Ok(self.state.stopped)
    }

    // ------------------------------------------------------------------------
    // Read operations
    // ------------------------------------------------------------------------

    /// Pool name
    pub fn name(&self) -> &'static str {
        pool::NAME
    }

    /// Ledger version
    pub fn version(&self) -> &'static str {
        pool::VERSION
    }

    /// Every deposit in chronological order
    pub fn deposit_history(&self) -> &[DepositRecord] {
        &self.state.history
    }

    /// Last reward injection
    pub fn reward_data(&self) -> RewardData {
        self.state.reward_data
    }

    /// Total value currently held
    pub fn balance(&self) -> u64 {
        self.state.held_value
    }

    pub fn owner(&self) -> Option<Address> {
        self.state.initialized.then_some(self.state.owner)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped
    }

    pub fn status(&self) -> PoolStatus {
        self.state.status()
    }

    pub fn total_outstanding(&self) -> u64 {
        self.state.total_outstanding
    }

    pub fn reward_index(&self) -> u128 {
        self.state.reward_index
    }

    pub fn absorbed_rewards(&self) -> u64 {
        self.state.absorbed_rewards
    }

    /// What `withdraw` would pay `participant` right now
    pub fn pending_payout(&self, participant: &Address) -> PoolResult<u64> {
        let index_now = self.state.reward_index;
        self.state
            .history
            .iter()
            .filter(|r| r.is_open_for(participant))
            .try_fold(0u64, |acc, r| {
                safe_add(acc, settlement_value(r.amount, r.index_snapshot, index_now)?)
            })
    }

    /// Verify the ledger invariants
    ///
    /// - the outstanding total equals the sum of unsettled principals
    /// - the held value covers every unsettled principal and accrued share
    /// - an uninitialized ledger holds nothing
    pub fn check_invariants(&self) -> PoolResult<()> {
        let state = &self.state;

        if !state.initialized
            && (!state.history.is_empty() || state.held_value != 0 || state.stopped)
        {
            return Err(PoolError::InvariantViolated {
                reason: "uninitialized pool has state",
            });
        }

        let mut outstanding: u64 = 0;
        let mut owed: u64 = 0;
        for record in state.history.iter().filter(|r| r.is_outstanding()) {
            if record.index_snapshot > state.reward_index {
                return Err(PoolError::InvariantViolated {
                    reason: "snapshot ahead of reward index",
                });
            }
            outstanding = safe_add(outstanding, record.amount)?;
            owed = safe_add(
                owed,
                settlement_value(record.amount, record.index_snapshot, state.reward_index)?,
            )?;
        }

        if outstanding != state.total_outstanding {
            return Err(PoolError::InvariantViolated {
                reason: "outstanding total does not match open records",
            });
        }

        if owed > state.held_value {
            return Err(PoolError::InvariantViolated {
                reason: "held value does not cover open records",
            });
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
