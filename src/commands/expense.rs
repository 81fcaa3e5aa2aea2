//! Expense command handlers.
//!
//! Every write path goes through `ExpenseDraft::validate`, so a split that
//! does not reconcile never reaches the database.

use crate::args::{AddExpenseArgs, EditExpenseArgs, ExpenseRefArgs, GroupRefArgs};
use crate::commands::{require_group, Out};
use crate::model::{Expense, ExpenseDraft, Group, Member, SplitInput, SplitMethod};
use crate::{Config, Result};
use anyhow::{bail, Context};
use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Records a new expense in a group.
///
/// Participants are given as `name` (equal split) or `name=value` where the
/// value's meaning follows the split method. With no participants and an
/// equal split, the expense is split across all group members.
///
/// # Errors
/// - Returns an error if the group, payer or any participant is unknown.
/// - Returns an error if the split does not validate; nothing is stored.
pub async fn add_expense(config: Config, args: AddExpenseArgs) -> Result<Out<Expense>> {
    let group = require_group(&config, args.group()).await?;
    let members = config.db().list_members(group.id()).await?;
    let payer = find_member(&members, args.payer(), &group)?;

    let participants = resolve_participants(&members, &group, args.method(), args.participants())?;

    let draft = ExpenseDraft {
        group_id: group.id().to_string(),
        title: args.title().to_string(),
        description: args.description().map(str::to_string),
        category: args.category(),
        amount: args.amount(),
        payer_id: payer.id().to_string(),
        split_method: args.method(),
        participants,
        date: args.date().unwrap_or_else(|| Utc::now().date_naive()),
    };

    let expense = draft.validate()?;
    config.db().insert_expense(&expense).await?;

    let message = format!(
        "Recorded '{}' for {} split {} among {} participant(s), id: {}",
        expense.title(),
        group.currency().format(expense.amount()),
        expense.split_method(),
        expense.splits().len(),
        expense.id()
    );
    Ok(Out::new(message, expense))
}

/// Lists a group's expenses, newest first.
pub async fn list_expenses(config: Config, args: GroupRefArgs) -> Result<Out<Vec<Expense>>> {
    let group = require_group(&config, args.group()).await?;
    let members = config.db().list_members(group.id()).await?;
    let expenses = config.db().list_expenses(group.id()).await?;

    if expenses.is_empty() {
        return Ok(Out::new_message(format!(
            "No expenses recorded in '{}' yet.",
            group.name()
        )));
    }

    let mut lines = vec![format!(
        "{} expense(s) in '{}':",
        expenses.len(),
        group.name()
    )];
    for expense in &expenses {
        lines.push(format!(
            "  {}  {}  {}  paid by {}  ({})  {}",
            expense.date(),
            expense.title(),
            group.currency().format(expense.amount()),
            member_name(&members, expense.payer_id()),
            expense.split_method(),
            expense.id(),
        ));
    }
    Ok(Out::new(lines.join("\n"), expenses))
}

/// Shows one expense in full, including its per-participant shares.
pub async fn show_expense(config: Config, args: ExpenseRefArgs) -> Result<Out<Expense>> {
    let expense = require_expense(&config, args.id()).await?;
    let group = config
        .db()
        .get_group(expense.group_id())
        .await?
        .context("The expense references a group that no longer exists")?;
    let members = config.db().list_members(group.id()).await?;

    let mut lines = vec![format!(
        "{}  {}  {}  paid by {} on {}",
        expense.title(),
        group.currency().format(expense.amount()),
        expense.category(),
        member_name(&members, expense.payer_id()),
        expense.date(),
    )];
    if let Some(description) = expense.description() {
        lines.push(format!("  {description}"));
    }
    lines.push(format!("  split: {}", expense.split_method()));
    for share in expense.splits() {
        lines.push(format!(
            "    {}  {}",
            member_name(&members, share.member_id()),
            group.currency().format(share.amount())
        ));
    }
    Ok(Out::new(lines.join("\n"), expense))
}

/// Edits an expense.
///
/// The stored raw split inputs are carried into a fresh draft, the requested
/// fields are replaced, and the draft is validated again. If validation
/// fails, the stored record is left untouched.
pub async fn edit_expense(config: Config, args: EditExpenseArgs) -> Result<Out<Expense>> {
    let existing = require_expense(&config, args.id()).await?;
    let members = config.db().list_members(existing.group_id()).await?;

    let mut draft = existing.to_draft();
    if let Some(title) = args.title() {
        draft.title = title.to_string();
    }
    if let Some(amount) = args.amount() {
        draft.amount = amount;
    }
    if let Some(payer) = args.payer() {
        let member = members
            .iter()
            .find(|m| m.name() == payer)
            .with_context(|| format!("No member named '{payer}' in the expense's group"))?;
        draft.payer_id = member.id().to_string();
    }
    if let Some(category) = args.category() {
        draft.category = category;
    }
    if let Some(description) = args.description() {
        draft.description = Some(description.to_string());
    }
    if let Some(date) = args.date() {
        draft.date = date;
    }

    let updated = draft.validate_with_id(existing.id().to_string())?;
    config.db().update_expense(&updated).await?;

    let message = format!("Updated expense '{}' ({})", updated.title(), updated.id());
    Ok(Out::new(message, updated))
}

/// Deletes an expense.
pub async fn delete_expense(config: Config, args: ExpenseRefArgs) -> Result<Out<String>> {
    if !config.db().delete_expense(args.id()).await? {
        bail!("No expense found with id '{}'", args.id());
    }
    let message = format!("Deleted expense {}", args.id());
    Ok(Out::new(message, args.id().to_string()))
}

async fn require_expense(config: &Config, id: &str) -> Result<Expense> {
    match config.db().get_expense(id).await? {
        Some(expense) => Ok(expense),
        None => bail!("No expense found with id '{id}'"),
    }
}

fn find_member<'a>(members: &'a [Member], name: &str, group: &Group) -> Result<&'a Member> {
    members
        .iter()
        .find(|m| m.name() == name)
        .with_context(|| format!("No member named '{}' in group '{}'", name, group.name()))
}

fn member_name(members: &[Member], id: &str) -> String {
    members
        .iter()
        .find(|m| m.id() == id)
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

/// Turns the `--participant` arguments into split inputs.
///
/// Each entry is `name` or `name=value`. Non-equal methods require a value
/// for every participant. An empty list means "all members" for an equal
/// split and is an error otherwise.
fn resolve_participants(
    members: &[Member],
    group: &Group,
    method: SplitMethod,
    raw: &[String],
) -> Result<Vec<SplitInput>> {
    if raw.is_empty() {
        if method != SplitMethod::Equal {
            bail!("A {method} split requires --participant name=value entries");
        }
        if members.is_empty() {
            bail!("Group '{}' has no members to split among", group.name());
        }
        return Ok(members
            .iter()
            .map(|m| SplitInput::new(m.id(), Decimal::ZERO))
            .collect());
    }

    let mut inputs = Vec::with_capacity(raw.len());
    for entry in raw {
        let (name, value) = match entry.split_once('=') {
            Some((name, value)) => {
                let value = Decimal::from_str(value.trim())
                    .with_context(|| format!("Invalid split value in '{entry}'"))?;
                (name.trim(), value)
            }
            None => {
                if method != SplitMethod::Equal {
                    bail!("Participant '{entry}' is missing a value for a {method} split");
                }
                (entry.trim(), Decimal::ZERO)
            }
        };
        let member = find_member(members, name, group)?;
        inputs.push(SplitInput::new(member.id(), value));
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, ExpenseCategory};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn add_args(
        group: &str,
        title: &str,
        amount_cents: i64,
        payer: &str,
        method: SplitMethod,
        participants: &[&str],
    ) -> AddExpenseArgs {
        AddExpenseArgs::new(
            group,
            title,
            Amount::from_minor_units(amount_cents),
            payer,
            method,
            participants.iter().map(|p| p.to_string()).collect(),
            ExpenseCategory::Other,
            None,
            Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_add_expense_equal_all_members() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob", "carol"]).await;

        let out = add_expense(
            env.config(),
            add_args("Trip", "Dinner", 1000, "alice", SplitMethod::Equal, &[]),
        )
        .await
        .unwrap();

        let expense = out.structure().unwrap();
        assert_eq!(expense.splits().len(), 3);
        let total: Amount = expense.splits().iter().map(|s| s.amount()).sum();
        assert_eq!(total, Amount::from_minor_units(1000));
    }

    #[tokio::test]
    async fn test_add_expense_custom_split() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;

        let out = add_expense(
            env.config(),
            add_args(
                "Trip",
                "Taxi",
                3000,
                "bob",
                SplitMethod::Custom,
                &["alice=10.00", "bob=20.00"],
            ),
        )
        .await
        .unwrap();

        let expense = out.structure().unwrap();
        assert_eq!(expense.splits()[0].amount(), Amount::from_minor_units(1000));
        assert_eq!(expense.splits()[1].amount(), Amount::from_minor_units(2000));
    }

    #[tokio::test]
    async fn test_add_expense_bad_split_stores_nothing() {
        let env = TestEnv::new().await;
        let group_id = env.create_group("Trip", &["alice", "bob"]).await;

        let result = add_expense(
            env.config(),
            add_args(
                "Trip",
                "Taxi",
                3000,
                "bob",
                SplitMethod::Custom,
                &["alice=10.00", "bob=10.00"],
            ),
        )
        .await;

        assert!(result.is_err());
        let stored = env.config().db().list_expenses(&group_id).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_add_expense_unknown_payer() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice"]).await;

        let result = add_expense(
            env.config(),
            add_args("Trip", "Dinner", 1000, "mallory", SplitMethod::Equal, &[]),
        )
        .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("mallory"));
    }

    #[tokio::test]
    async fn test_add_expense_missing_value_for_custom() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;

        let result = add_expense(
            env.config(),
            add_args(
                "Trip",
                "Taxi",
                3000,
                "bob",
                SplitMethod::Custom,
                &["alice", "bob=20.00"],
            ),
        )
        .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing a value"));
    }

    #[tokio::test]
    async fn test_list_expenses_newest_first() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;

        for (title, date) in [("Old", "2025-05-01"), ("New", "2025-06-01")] {
            let args = AddExpenseArgs::new(
                "Trip",
                title,
                Amount::from_minor_units(1000),
                "alice",
                SplitMethod::Equal,
                vec![],
                ExpenseCategory::Other,
                None,
                Some(date.parse().unwrap()),
            );
            add_expense(env.config(), args).await.unwrap();
        }

        let out = list_expenses(env.config(), GroupRefArgs::new("Trip"))
            .await
            .unwrap();
        let expenses = out.structure().unwrap();
        assert_eq!(expenses[0].title(), "New");
        assert_eq!(expenses[1].title(), "Old");
    }

    #[tokio::test]
    async fn test_show_expense_includes_shares() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;
        let id = env.add_equal_expense("Trip", "Dinner", 1000, "alice").await;

        let out = show_expense(env.config(), ExpenseRefArgs::new(&id))
            .await
            .unwrap();
        assert!(out.message().contains("Dinner"));
        assert!(out.message().contains("alice"));
        assert!(out.message().contains("bob"));
    }

    #[tokio::test]
    async fn test_edit_expense_revalidates() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;
        let id = env.add_equal_expense("Trip", "Dinner", 1000, "alice").await;

        let out = edit_expense(
            env.config(),
            EditExpenseArgs::new(
                &id,
                Some("Fancy dinner".to_string()),
                Some(Amount::from_minor_units(2000)),
                None,
                None,
                None,
                None,
            ),
        )
        .await
        .unwrap();

        let updated = out.structure().unwrap();
        assert_eq!(updated.title(), "Fancy dinner");
        // Equal split recomputed from the new amount.
        assert_eq!(updated.splits()[0].amount(), Amount::from_minor_units(1000));

        let reloaded = env.config().db().get_expense(&id).await.unwrap().unwrap();
        assert_eq!(&reloaded, updated);
    }

    #[tokio::test]
    async fn test_edit_that_breaks_reconciliation_is_rejected() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;

        let out = add_expense(
            env.config(),
            add_args(
                "Trip",
                "Taxi",
                3000,
                "bob",
                SplitMethod::Custom,
                &["alice=10.00", "bob=20.00"],
            ),
        )
        .await
        .unwrap();
        let id = out.structure().unwrap().id().to_string();

        // Changing the amount invalidates the stored custom values.
        let result = edit_expense(
            env.config(),
            EditExpenseArgs::new(
                &id,
                None,
                Some(Amount::from_minor_units(9999)),
                None,
                None,
                None,
                None,
            ),
        )
        .await;
        assert!(result.is_err());

        // The stored record is untouched.
        let reloaded = env.config().db().get_expense(&id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount(), Amount::from_minor_units(3000));
    }

    #[tokio::test]
    async fn test_delete_expense() {
        let env = TestEnv::new().await;
        env.create_group("Trip", &["alice", "bob"]).await;
        let id = env.add_equal_expense("Trip", "Dinner", 1000, "alice").await;

        delete_expense(env.config(), ExpenseRefArgs::new(&id))
            .await
            .unwrap();

        assert!(env.config().db().get_expense(&id).await.unwrap().is_none());

        let result = delete_expense(env.config(), ExpenseRefArgs::new(&id)).await;
        assert!(result.is_err());
    }
}
