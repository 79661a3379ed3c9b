//! Reward Index Math
//!
//! Fixed-point arithmetic for lazy pro-rata reward distribution.
//!
//! The pool keeps one global index: the cumulative reward paid per unit of
//! outstanding deposit, scaled by `SCALE_FACTOR`. A deposit snapshots the
//! index when it is made; its share at withdrawal is
//! `amount × (index_now − index_snapshot) / SCALE_FACTOR`.
//!
//! All divisions round down, so the shares paid out for one injection never
//! exceed the injection. The index division remainder is carried into the
//! next injection; the per-record remainder (under one wei per record)
//! stays in the pool.

use crate::constants::precision::SCALE_FACTOR;
use crate::errors::{PoolError, PoolResult};

/// Index increment for a reward spread over `outstanding` units
///
/// increment = floor((reward × SCALE_FACTOR + carry) / outstanding)
///
/// Returns `(increment, carry)`. The new carry is the division remainder,
/// always below `outstanding`, and joins the next reward's numerator so
/// truncation never accumulates across injections.
pub fn index_increment(reward: u64, outstanding: u64, carry: u128) -> PoolResult<(u128, u128)> {
    // reward < 2^64 and carry < 2^64, so the numerator fits in u128
    let numerator = (reward as u128)
        .checked_mul(SCALE_FACTOR)
        .and_then(|n| n.checked_add(carry))
        .ok_or(PoolError::Overflow)?;
    let outstanding = outstanding as u128;
    let increment = numerator
        .checked_div(outstanding)
        .ok_or(PoolError::DivisionByZero)?;
    Ok((increment, numerator % outstanding))
}

/// Advance the global index and carry by a reward
///
/// Returns both unchanged when nothing is outstanding; the caller
/// decides what happens to an undistributable reward.
pub fn advance_index(
    index: u128,
    carry: u128,
    reward: u64,
    outstanding: u64,
) -> PoolResult<(u128, u128)> {
    if outstanding == 0 {
        return Ok((index, carry));
    }
    let (increment, carry) = index_increment(reward, outstanding, carry)?;
    let index = index.checked_add(increment).ok_or(PoolError::Overflow)?;
    Ok((index, carry))
}

/// Reward share accrued by `amount` between two index values
///
/// Computes floor(amount × delta / SCALE_FACTOR) exactly without a 256-bit
/// intermediate: with delta = q × SCALE_FACTOR + r,
/// share = amount × q + floor(amount × r / SCALE_FACTOR).
pub fn accrued_share(amount: u64, index_snapshot: u128, index_now: u128) -> PoolResult<u64> {
    let delta = index_now
        .checked_sub(index_snapshot)
        .ok_or(PoolError::Underflow)?;

    let q = delta / SCALE_FACTOR;
    let r = delta % SCALE_FACTOR;

    // r < 2^64 and amount < 2^64, so amount * r < 2^128
    let whole = (amount as u128).checked_mul(q).ok_or(PoolError::Overflow)?;
    let fraction = (amount as u128) * r / SCALE_FACTOR;

    let share = whole.checked_add(fraction).ok_or(PoolError::Overflow)?;
    u64::try_from(share).map_err(|_| PoolError::Overflow)
}

/// Principal plus accrued share
pub fn settlement_value(amount: u64, index_snapshot: u128, index_now: u128) -> PoolResult<u64> {
    amount
        .checked_add(accrued_share(amount, index_snapshot, index_now)?)
        .ok_or(PoolError::Overflow)
}

/// Checked u64 addition
pub fn safe_add(a: u64, b: u64) -> PoolResult<u64> {
    a.checked_add(b).ok_or(PoolError::Overflow)
}

/// Checked u64 subtraction
pub fn safe_sub(a: u64, b: u64) -> PoolResult<u64> {
    a.checked_sub(b).ok_or(PoolError::Underflow)
}
