//! Balance and settlement command handlers.
//!
//! Balances are recomputed from the stored expense list on every invocation;
//! nothing here reads a cached balance.

use crate::args::{BalancesArgs, SettleArgs};
use crate::balance;
use crate::commands::{require_group, Out};
use crate::model::{Amount, Member};
use crate::settlement::{self, Transfer};
use crate::{Config, Result};
use std::collections::BTreeMap;

/// Net balances keyed by member name, for display and structured output.
pub type NamedBalances = BTreeMap<String, Amount>;

/// Shows each member's net balance in a group: positive means the group owes
/// them, negative means they owe the group.
pub async fn balances(config: Config, args: BalancesArgs) -> Result<Out<NamedBalances>> {
    let group = require_group(&config, args.group()).await?;
    let members = config.db().list_members(group.id()).await?;
    let expenses = config.db().list_expenses(group.id()).await?;

    let by_id = balance::aggregate(&expenses, &members)?;
    let named = name_balances(by_id, &members);

    let mut lines = vec![format!("Balances for '{}':", group.name())];
    for (name, amount) in &named {
        let position = if amount.is_positive() {
            "is owed"
        } else if amount.is_negative() {
            "owes"
        } else {
            "settled"
        };
        lines.push(format!(
            "  {}  {}  ({})",
            name,
            group.currency().format(*amount),
            position
        ));
    }
    Ok(Out::new(lines.join("\n"), named))
}

/// Suggests the payments that settle a group's balances.
pub async fn settle(config: Config, args: SettleArgs) -> Result<Out<Vec<Transfer>>> {
    let group = require_group(&config, args.group()).await?;
    let members = config.db().list_members(group.id()).await?;
    let expenses = config.db().list_expenses(group.id()).await?;

    let by_id = balance::aggregate(&expenses, &members)?;
    let transfers = settlement::plan_transfers(&by_id)?;

    if transfers.is_empty() {
        return Ok(Out::new_message(format!(
            "Group '{}' is already settled.",
            group.name()
        )));
    }

    // Report transfers by member name rather than id.
    let named: Vec<Transfer> = transfers
        .into_iter()
        .map(|t| Transfer {
            from: member_name(&members, &t.from),
            to: member_name(&members, &t.to),
            amount: t.amount,
        })
        .collect();

    let mut lines = vec![format!(
        "{} payment(s) settle group '{}':",
        named.len(),
        group.name()
    )];
    for transfer in &named {
        lines.push(format!(
            "  {} pays {} {}",
            transfer.from,
            transfer.to,
            group.currency().format(transfer.amount)
        ));
    }
    Ok(Out::new(lines.join("\n"), named))
}

fn name_balances(by_id: balance::Balances, members: &[Member]) -> NamedBalances {
    by_id
        .into_iter()
        .map(|(id, amount)| (member_name(members, &id), amount))
        .collect()
}

fn member_name(members: &[Member], id: &str) -> String {
    members
        .iter()
        .find(|m| m.id() == id)
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| id.to_string())
}
