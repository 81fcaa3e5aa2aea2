//! Group and member command handlers.

use crate::args::{GroupCreateArgs, GroupRefArgs, MemberArgs};
use crate::commands::{require_group, Out};
use crate::model::{Group, Member};
use crate::{Config, Result};
use anyhow::bail;

/// Creates a new group, optionally with its initial members.
///
/// # Errors
/// - Returns an error if a group with the same name already exists.
/// - Returns an error if the same member name is given twice.
pub async fn create_group(config: Config, args: GroupCreateArgs) -> Result<Out<Group>> {
    if config.db().find_group_by_name(args.name()).await?.is_some() {
        bail!("A group named '{}' already exists", args.name());
    }

    let currency = args.currency().unwrap_or_else(|| config.default_currency());
    let group = Group::new(args.name(), currency);
    config.db().insert_group(&group).await?;

    for name in args.members() {
        let member = Member::new(group.id(), name);
        config.db().insert_member(&member).await?;
    }

    let message = format!(
        "Created group '{}' ({}) with {} member(s)",
        group.name(),
        group.currency(),
        args.members().len()
    );
    Ok(Out::new(message, group))
}

/// Lists all groups.
pub async fn list_groups(config: Config) -> Result<Out<Vec<Group>>> {
    let groups = config.db().list_groups().await?;
    if groups.is_empty() {
        return Ok(Out::new_message(
            "No groups yet. Create one with 'splitbill group create'.",
        ));
    }

    let mut lines = vec![format!("{} group(s):", groups.len())];
    for group in &groups {
        lines.push(format!("  {} ({})", group.name(), group.currency()));
    }
    Ok(Out::new(lines.join("\n"), groups))
}

/// Lists the members of a group.
pub async fn list_members(config: Config, args: GroupRefArgs) -> Result<Out<Vec<Member>>> {
    let group = require_group(&config, args.group()).await?;
    let members = config.db().list_members(group.id()).await?;

    let mut lines = vec![format!(
        "{} member(s) in '{}':",
        members.len(),
        group.name()
    )];
    for member in &members {
        lines.push(format!("  {}", member.name()));
    }
    Ok(Out::new(lines.join("\n"), members))
}

/// Adds a member to a group.
///
/// # Errors
/// - Returns an error if the group does not exist or the member name is
///   already taken within it.
pub async fn add_member(config: Config, args: MemberArgs) -> Result<Out<Member>> {
    let group = require_group(&config, args.group()).await?;
    let member = Member::new(group.id(), args.name());
    config.db().insert_member(&member).await?;

    let message = format!("Added '{}' to group '{}'", member.name(), group.name());
    Ok(Out::new(message, member))
}

/// Removes a member from a group.
///
/// A member that appears on any expense cannot be removed; the expense
/// history must stay replayable, since balances are recomputed from it.
pub async fn remove_member(config: Config, args: MemberArgs) -> Result<Out<String>> {
    let group = require_group(&config, args.group()).await?;
    let Some(member) = config
        .db()
        .find_member_by_name(group.id(), args.name())
        .await?
    else {
        bail!(
            "No member named '{}' in group '{}'",
            args.name(),
            group.name()
        );
    };

    if config.db().member_has_expenses(member.id()).await? {
        bail!(
            "Cannot remove '{}': the member appears on recorded expenses",
            member.name()
        );
    }

    config.db().delete_member(member.id()).await?;
    let message = format!("Removed '{}' from group '{}'", member.name(), group.name());
    Ok(Out::new(message, member.id().to_string()))
}
