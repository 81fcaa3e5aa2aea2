//! The `summary` command: aggregate figures for one group.

use crate::analytics::{self, GroupSummary};
use crate::args::SummaryArgs;
use crate::commands::{require_group, Out};
use crate::{Config, Result};
use chrono::Utc;

/// Builds and prints the summary for a group: total and current-month
/// spending, per-category and per-payer breakdowns, and net balances.
pub async fn summary(config: Config, args: SummaryArgs) -> Result<Out<GroupSummary>> {
    let group = require_group(&config, args.group()).await?;
    let members = config.db().list_members(group.id()).await?;
    let expenses = config.db().list_expenses(group.id()).await?;

    let month_of = args.month_of().unwrap_or_else(|| Utc::now().date_naive());
    let summary = analytics::summarize(&group, &members, &expenses, month_of)?;

    let currency = group.currency();
    let mut lines = vec![format!(
        "Summary for '{}': {} across {} expense(s), {} in {}",
        summary.group_name,
        currency.format(summary.total_spent),
        summary.expense_count,
        currency.format(summary.month_spent),
        month_of.format("%B %Y"),
    )];
    if !summary.by_category.is_empty() {
        lines.push("By category:".to_string());
        for (category, total) in &summary.by_category {
            lines.push(format!("  {}  {}", category, currency.format(*total)));
        }
    }
    if !summary.paid_by_member.is_empty() {
        lines.push("Paid by:".to_string());
        for (member_id, total) in &summary.paid_by_member {
            let name = members
                .iter()
                .find(|m| m.id() == member_id.as_str())
                .map(|m| m.name().to_string())
                .unwrap_or_else(|| member_id.clone());
            lines.push(format!("  {}  {}", name, currency.format(*total)));
        }
    }
    Ok(Out::new(lines.join("\n"), summary))
}
