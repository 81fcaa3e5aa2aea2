//! The balance aggregator: folds a set of expenses into net balances per
//! member.
//!
//! Balances are never stored; they are recomputed from the expense list on
//! every read, so they cannot drift from the records they are derived from.

use crate::model::{Amount, Expense, Member};
use std::collections::BTreeMap;
use thiserror::Error;

/// Net balance per member id. Positive means the group owes the member,
/// negative means the member owes the group. `BTreeMap` keeps iteration order
/// stable for display and for deterministic settlement planning.
pub type Balances = BTreeMap<String, Amount>;

/// Failures while deriving balances. The aggregator never produces partial
/// output; a wrong financial number is worse than a visible failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// A stored expense's shares do not sum to its amount. Validation makes
    /// this impossible on the write path, so hitting it means the stored data
    /// was corrupted or written by something that bypassed validation.
    #[error("expense '{0}' has shares that do not sum to its amount")]
    InconsistentExpense(String),

    /// Settlement was requested over balances that do not sum to zero.
    #[error("balances total {0} but a closed ledger must total zero")]
    UnbalancedLedger(Amount),
}

/// Folds `expenses` into net balances. The result is pre-seeded with every
/// member of `members` at zero, so members with no activity still show up.
///
/// Per expense: the payer's balance increases by the full amount and each
/// participant's balance decreases by their share. The fold is a pure
/// summation, so the result does not depend on expense ordering.
pub fn aggregate(expenses: &[Expense], members: &[Member]) -> Result<Balances, BalanceError> {
    let mut balances: Balances = members
        .iter()
        .map(|m| (m.id().to_string(), Amount::ZERO))
        .collect();

    for expense in expenses {
        let share_total: Amount = expense.splits().iter().map(|s| s.amount()).sum();
        if share_total != expense.amount() {
            return Err(BalanceError::InconsistentExpense(expense.id().to_string()));
        }

        *balances
            .entry(expense.payer_id().to_string())
            .or_insert(Amount::ZERO) += expense.amount();

        for share in expense.splits() {
            *balances
                .entry(share.member_id().to_string())
                .or_insert(Amount::ZERO) -= share.amount();
        }
    }

    Ok(balances)
}
