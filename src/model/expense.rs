//! Types that represent a shared expense and its split.
//!
//! An expense enters the system as an [`ExpenseDraft`] built from raw user
//! input. The only way to obtain an [`Expense`] from a draft is
//! [`ExpenseDraft::validate`], which runs the split calculator; storage only
//! ever accepts validated expenses.

use crate::model::Amount;
use crate::split::{self, SplitError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The rule used to divide an expense amount among participants.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Amount divided evenly among all participants.
    #[default]
    Equal,
    /// Raw values are absolute monetary shares.
    Custom,
    /// Raw values are percentages summing to 100.
    Percentage,
    /// Raw values are non-negative integer weights.
    Shares,
}

serde_plain::derive_display_from_serialize!(SplitMethod);
serde_plain::derive_fromstr_from_deserialize!(SplitMethod);

/// The fixed category set used for expense grouping.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Utilities,
    Healthcare,
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(ExpenseCategory);
serde_plain::derive_fromstr_from_deserialize!(ExpenseCategory);

/// One participant's raw input for a split: the meaning of `raw_value` depends
/// on the split method (ignored for `Equal`, a monetary share for `Custom`, a
/// percentage for `Percentage`, a weight for `Shares`).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SplitInput {
    pub(crate) member_id: String,
    pub(crate) raw_value: Decimal,
}

impl SplitInput {
    pub fn new(member_id: impl Into<String>, raw_value: Decimal) -> Self {
        Self {
            member_id: member_id.into(),
            raw_value,
        }
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn raw_value(&self) -> Decimal {
        self.raw_value
    }
}

/// One participant's validated slice of an expense: the raw input it was
/// computed from plus the resulting monetary share.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SplitEntry {
    pub(crate) member_id: String,
    pub(crate) raw_value: Decimal,
    pub(crate) amount: Amount,
}

impl SplitEntry {
    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn raw_value(&self) -> Decimal {
        self.raw_value
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Raw user input for an expense, not yet validated.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExpenseDraft {
    pub group_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ExpenseCategory,
    pub amount: Amount,
    pub payer_id: String,
    pub split_method: SplitMethod,
    pub participants: Vec<SplitInput>,
    pub date: NaiveDate,
}

impl ExpenseDraft {
    /// Validates the draft and produces a recorded-ready expense with a fresh
    /// id. Fails if the split does not reconcile; see [`SplitError`].
    pub fn validate(self) -> Result<Expense, SplitError> {
        self.validate_with_id(Uuid::new_v4().to_string())
    }

    /// Validates the draft keeping an existing id. Used when an edit replays
    /// validation over a stored expense.
    pub fn validate_with_id(self, id: impl Into<String>) -> Result<Expense, SplitError> {
        let member_ids: Vec<&str> = self
            .participants
            .iter()
            .map(|p| p.member_id.as_str())
            .collect();
        let raw_values: Vec<Decimal> = self.participants.iter().map(|p| p.raw_value).collect();
        let shares = split::compute_split(self.amount, self.split_method, &member_ids, &raw_values)?;

        let splits = self
            .participants
            .into_iter()
            .zip(shares)
            .map(|(input, amount)| SplitEntry {
                member_id: input.member_id,
                raw_value: input.raw_value,
                amount,
            })
            .collect();

        Ok(Expense {
            id: id.into(),
            group_id: self.group_id,
            title: self.title,
            description: self.description,
            category: self.category,
            amount: self.amount,
            payer_id: self.payer_id,
            split_method: self.split_method,
            date: self.date,
            splits,
        })
    }
}

/// A validated, recorded-ready expense. Construction goes through
/// [`ExpenseDraft::validate`]; the splits are guaranteed to sum exactly to
/// the amount at that point. Records reloaded from storage are re-checked by
/// the balance aggregator before they influence any balance.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    pub(crate) id: String,
    pub(crate) group_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category: ExpenseCategory,
    pub(crate) amount: Amount,
    pub(crate) payer_id: String,
    pub(crate) split_method: SplitMethod,
    pub(crate) date: NaiveDate,
    pub(crate) splits: Vec<SplitEntry>,
}

impl Expense {
    /// Reconstructs an expense from stored fields without re-validation.
    /// Only the storage layer uses this; consumers that fold expenses into
    /// balances must go through the aggregator, which re-checks reconciliation.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: String,
        group_id: String,
        title: String,
        description: Option<String>,
        category: ExpenseCategory,
        amount: Amount,
        payer_id: String,
        split_method: SplitMethod,
        date: NaiveDate,
        splits: Vec<SplitEntry>,
    ) -> Self {
        Self {
            id,
            group_id,
            title,
            description,
            category,
            amount,
            payer_id,
            split_method,
            date,
            splits,
        }
    }

    /// Rebuilds a draft carrying this expense's raw inputs, so an edit can
    /// change some fields and re-run validation from the original values.
    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            group_id: self.group_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            amount: self.amount,
            payer_id: self.payer_id.clone(),
            split_method: self.split_method,
            participants: self
                .splits
                .iter()
                .map(|s| SplitInput::new(s.member_id.clone(), s.raw_value))
                .collect(),
            date: self.date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn payer_id(&self) -> &str {
        &self.payer_id
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn splits(&self) -> &[SplitEntry] {
        &self.splits
    }

    /// The share recorded for `member_id`, if the member participated.
    pub fn share_of(&self, member_id: &str) -> Option<Amount> {
        self.splits
            .iter()
            .find(|s| s.member_id == member_id)
            .map(|s| s.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(amount: Amount, method: SplitMethod, participants: Vec<SplitInput>) -> ExpenseDraft {
        ExpenseDraft {
            group_id: "g1".to_string(),
            title: "Dinner".to_string(),
            description: None,
            category: ExpenseCategory::Food,
            amount,
            payer_id: "alice".to_string(),
            split_method: method,
            participants,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_validate_produces_reconciled_splits() {
        let d = draft(
            Amount::from_minor_units(1000),
            SplitMethod::Equal,
            vec![
                SplitInput::new("alice", Decimal::ZERO),
                SplitInput::new("bob", Decimal::ZERO),
                SplitInput::new("carol", Decimal::ZERO),
            ],
        );
        let expense = d.validate().unwrap();

        let total: Amount = expense.splits().iter().map(SplitEntry::amount).sum();
        assert_eq!(total, expense.amount());
        assert_eq!(expense.splits().len(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_custom_split() {
        let d = draft(
            Amount::from_minor_units(10000),
            SplitMethod::Custom,
            vec![
                SplitInput::new("alice", Decimal::new(40, 0)),
                SplitInput::new("bob", Decimal::new(35, 0)),
                SplitInput::new("carol", Decimal::new(24, 0)),
            ],
        );
        assert!(matches!(d.validate(), Err(SplitError::SplitMismatch { .. })));
    }

    #[test]
    fn test_to_draft_round_trips_raw_inputs() {
        let d = draft(
            Amount::from_minor_units(4000),
            SplitMethod::Shares,
            vec![
                SplitInput::new("alice", Decimal::ONE),
                SplitInput::new("bob", Decimal::ONE),
                SplitInput::new("carol", Decimal::TWO),
            ],
        );
        let expense = d.clone().validate().unwrap();
        let rebuilt = expense.to_draft();
        assert_eq!(rebuilt, d);

        // Re-validating the rebuilt draft keeps the same shares.
        let again = rebuilt.validate_with_id(expense.id().to_string()).unwrap();
        assert_eq!(again, expense);
    }

    #[test]
    fn test_split_method_display_round_trip() {
        use std::str::FromStr;
        assert_eq!(SplitMethod::Percentage.to_string(), "percentage");
        assert_eq!(SplitMethod::from_str("shares").unwrap(), SplitMethod::Shares);
        assert_eq!(ExpenseCategory::Food.to_string(), "food");
        assert_eq!(
            ExpenseCategory::from_str("healthcare").unwrap(),
            ExpenseCategory::Healthcare
        );
    }

    #[test]
    fn test_share_of() {
        let d = draft(
            Amount::from_minor_units(900),
            SplitMethod::Equal,
            vec![
                SplitInput::new("alice", Decimal::ZERO),
                SplitInput::new("bob", Decimal::ZERO),
            ],
        );
        let expense = d.validate().unwrap();
        assert_eq!(expense.share_of("alice"), Some(Amount::from_minor_units(450)));
        assert_eq!(expense.share_of("mallory"), None);
    }
}
