//! The split calculator: turns a raw split request into per-participant
//! monetary shares that reconcile exactly with the expense amount.
//!
//! Rounding policy: every computed share is rounded to currency precision and
//! the last participant absorbs the rounding remainder, so the sum of the
//! returned shares always equals the input amount exactly.

use crate::model::{Amount, SplitMethod};
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;

/// Validation failures for a split request. All variants are user-correctable;
/// none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("expense amount must be greater than zero")]
    InvalidAmount,

    #[error("at least one participant is required")]
    NoParticipants,

    #[error("participant '{0}' appears more than once")]
    DuplicateParticipant(String),

    #[error("expected {expected} split values for {expected} participants but got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("split value for participant '{0}' is negative")]
    NegativeShare(String),

    #[error("percentage for participant '{0}' must be between 0 and 100")]
    InvalidPercentage(String),

    #[error("share weight for participant '{0}' must be a whole number")]
    InvalidWeight(String),

    #[error("split values total {total} but should total {expected}")]
    SplitMismatch { total: Decimal, expected: Decimal },

    #[error("total share weight must be greater than zero")]
    InvalidShares,
}

/// Reconciliation tolerance on user-supplied totals, in currency units.
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Computes the per-participant shares for an expense.
///
/// `raw_values` must align one-to-one with `participants` for every method
/// except [`SplitMethod::Equal`], where the values are ignored.
///
/// Postcondition: the returned shares sum exactly to `amount`.
pub fn compute_split(
    amount: Amount,
    method: SplitMethod,
    participants: &[&str],
    raw_values: &[Decimal],
) -> Result<Vec<Amount>, SplitError> {
    if !amount.is_positive() {
        return Err(SplitError::InvalidAmount);
    }
    if participants.is_empty() {
        return Err(SplitError::NoParticipants);
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(SplitError::DuplicateParticipant((*id).to_string()));
        }
    }

    if method != SplitMethod::Equal && raw_values.len() != participants.len() {
        return Err(SplitError::ValueCountMismatch {
            expected: participants.len(),
            actual: raw_values.len(),
        });
    }

    match method {
        SplitMethod::Equal => Ok(equal_split(amount, participants.len())),
        SplitMethod::Custom => custom_split(amount, participants, raw_values),
        SplitMethod::Percentage => percentage_split(amount, participants, raw_values),
        SplitMethod::Shares => weighted_split(amount, participants, raw_values),
    }
}

/// Each share is `amount / n` at currency precision; the last participant
/// absorbs the remainder.
fn equal_split(amount: Amount, n: usize) -> Vec<Amount> {
    let even = Amount::new(amount.value() / Decimal::from(n as u64));
    distribute(amount, vec![even; n])
}

fn custom_split(
    amount: Amount,
    participants: &[&str],
    raw_values: &[Decimal],
) -> Result<Vec<Amount>, SplitError> {
    for (id, value) in participants.iter().zip(raw_values) {
        if value.is_sign_negative() {
            return Err(SplitError::NegativeShare((*id).to_string()));
        }
    }

    let total: Decimal = raw_values.iter().sum();
    if (total - amount.value()).abs() > tolerance() {
        return Err(SplitError::SplitMismatch {
            total,
            expected: amount.value(),
        });
    }

    // Values inside the tolerance are accepted; the residual cent, if any,
    // lands on the last participant so the stored shares reconcile exactly.
    let shares = raw_values.iter().map(|v| Amount::new(*v)).collect();
    Ok(distribute(amount, shares))
}

fn percentage_split(
    amount: Amount,
    participants: &[&str],
    raw_values: &[Decimal],
) -> Result<Vec<Amount>, SplitError> {
    let hundred = Decimal::ONE_HUNDRED;
    for (id, pct) in participants.iter().zip(raw_values) {
        if pct.is_sign_negative() || *pct > hundred {
            return Err(SplitError::InvalidPercentage((*id).to_string()));
        }
    }

    let total: Decimal = raw_values.iter().sum();
    if (total - hundred).abs() > tolerance() {
        return Err(SplitError::SplitMismatch {
            total,
            expected: hundred,
        });
    }

    let shares = raw_values
        .iter()
        .map(|pct| Amount::new(amount.value() * pct / hundred))
        .collect();
    Ok(distribute(amount, shares))
}

fn weighted_split(
    amount: Amount,
    participants: &[&str],
    raw_values: &[Decimal],
) -> Result<Vec<Amount>, SplitError> {
    for (id, weight) in participants.iter().zip(raw_values) {
        if weight.is_sign_negative() || !weight.fract().is_zero() {
            return Err(SplitError::InvalidWeight((*id).to_string()));
        }
    }

    let total: Decimal = raw_values.iter().sum();
    if total <= Decimal::ZERO {
        return Err(SplitError::InvalidShares);
    }

    let shares = raw_values
        .iter()
        .map(|weight| Amount::new(amount.value() * weight / total))
        .collect();
    Ok(distribute(amount, shares))
}

/// Replaces the last share with whatever is left of `amount` after the other
/// shares, making the sum reconcile exactly.
fn distribute(amount: Amount, mut shares: Vec<Amount>) -> Vec<Amount> {
    let all_but_last: Amount = shares[..shares.len() - 1].iter().copied().sum();
    if let Some(last) = shares.last_mut() {
        *last = amount - all_but_last;
    }
    shares
}
