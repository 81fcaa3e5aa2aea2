//! Group summary aggregation for the `summary` command.
//!
//! The summary is computed from the expense list in one pass and reuses the
//! balance aggregator for the balance section; nothing here recomputes
//! balances independently.

use crate::balance::{self, BalanceError, Balances};
use crate::model::{Amount, Currency, Expense, ExpenseCategory, Group, Member};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated figures for one group.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    pub group_id: String,
    pub group_name: String,
    pub currency: Currency,
    /// Sum of all expense amounts in the group.
    pub total_spent: Amount,
    pub expense_count: usize,
    /// Total for the month of `month_of` (year + month match).
    pub month_spent: Amount,
    pub by_category: BTreeMap<ExpenseCategory, Amount>,
    /// Totals fronted per payer.
    pub paid_by_member: BTreeMap<String, Amount>,
    pub balances: Balances,
}

/// Builds the summary for a group. `month_of` selects which month the
/// `month_spent` figure covers; the CLI passes today, tests pass a fixed date.
pub fn summarize(
    group: &Group,
    members: &[Member],
    expenses: &[Expense],
    month_of: NaiveDate,
) -> Result<GroupSummary, BalanceError> {
    let balances = balance::aggregate(expenses, members)?;

    let mut total_spent = Amount::ZERO;
    let mut month_spent = Amount::ZERO;
    let mut by_category: BTreeMap<ExpenseCategory, Amount> = BTreeMap::new();
    let mut paid_by_member: BTreeMap<String, Amount> = BTreeMap::new();

    for expense in expenses {
        total_spent += expense.amount();
        if expense.date().year() == month_of.year() && expense.date().month() == month_of.month() {
            month_spent += expense.amount();
        }
        *by_category.entry(expense.category()).or_insert(Amount::ZERO) += expense.amount();
        *paid_by_member
            .entry(expense.payer_id().to_string())
            .or_insert(Amount::ZERO) += expense.amount();
    }

    Ok(GroupSummary {
        group_id: group.id().to_string(),
        group_name: group.name().to_string(),
        currency: group.currency(),
        total_spent,
        expense_count: expenses.len(),
        month_spent,
        by_category,
        paid_by_member,
        balances,
    })
}
