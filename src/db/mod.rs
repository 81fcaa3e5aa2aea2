//! This module is responsible for reading, writing and managing the SQLite
//! database that holds groups, members and expenses.
//!
//! Amounts and raw split values are stored as canonical decimal text; SQLite
//! has no decimal column type and floating-point columns would reintroduce
//! the drift the `Amount` type exists to prevent. Balances are never stored.

use crate::model::{
    Amount, Currency, Expense, ExpenseCategory, Group, Member, SplitEntry, SplitMethod,
};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

const CREATE_GROUPS: &str = "\
CREATE TABLE IF NOT EXISTS groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    currency TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const CREATE_MEMBERS: &str = "\
CREATE TABLE IF NOT EXISTS members (
    id TEXT PRIMARY KEY,
    group_id TEXT NOT NULL REFERENCES groups(id),
    name TEXT NOT NULL,
    UNIQUE (group_id, name)
)";

const CREATE_EXPENSES: &str = "\
CREATE TABLE IF NOT EXISTS expenses (
    id TEXT PRIMARY KEY,
    group_id TEXT NOT NULL REFERENCES groups(id),
    title TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL,
    amount TEXT NOT NULL,
    payer_id TEXT NOT NULL REFERENCES members(id),
    split_method TEXT NOT NULL,
    date TEXT NOT NULL
)";

const CREATE_EXPENSE_SHARES: &str = "\
CREATE TABLE IF NOT EXISTS expense_shares (
    expense_id TEXT NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    member_id TEXT NOT NULL REFERENCES members(id),
    position INTEGER NOT NULL,
    raw_value TEXT NOT NULL,
    amount TEXT NOT NULL,
    PRIMARY KEY (expense_id, member_id)
)";

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path` and initializes the schema
    /// - Returns a constructed `Db` for further operations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database file already exists at '{}'", path.display());
        }
        let db = Self::connect(path, true).await?;
        db.create_schema().await?;
        Ok(db)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Creates the connection pool with foreign keys enforced
    /// - Returns a constructed `Db` for further operations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!(
                "The database file is missing at '{}', run 'splitbill init' first",
                path.display()
            );
        }
        Self::connect(path, false).await
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database at {}", path.display()))?;
        Ok(Self { pool })
    }

    async fn create_schema(&self) -> Result<()> {
        for statement in [
            CREATE_GROUPS,
            CREATE_MEMBERS,
            CREATE_EXPENSES,
            CREATE_EXPENSE_SHARES,
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Unable to create database schema")?;
        }
        Ok(())
    }

    // ==================== groups ====================

    pub(crate) async fn insert_group(&self, group: &Group) -> Result<()> {
        sqlx::query("INSERT INTO groups (id, name, currency, created_at) VALUES (?, ?, ?, ?)")
            .bind(group.id())
            .bind(group.name())
            .bind(group.currency().to_string())
            .bind(group.created_at().to_rfc3339())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to insert group '{}'", group.name()))?;
        Ok(())
    }

    pub(crate) async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        let row = sqlx::query("SELECT id, name, currency, created_at FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to query groups")?;
        row.map(group_from_row).transpose()
    }

    pub(crate) async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let row = sqlx::query("SELECT id, name, currency, created_at FROM groups WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to query groups")?;
        row.map(group_from_row).transpose()
    }

    pub(crate) async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows =
            sqlx::query("SELECT id, name, currency, created_at FROM groups ORDER BY created_at")
                .fetch_all(&self.pool)
                .await
                .context("Unable to list groups")?;
        rows.into_iter().map(group_from_row).collect()
    }

    // ==================== members ====================

    pub(crate) async fn insert_member(&self, member: &Member) -> Result<()> {
        sqlx::query("INSERT INTO members (id, group_id, name) VALUES (?, ?, ?)")
            .bind(member.id())
            .bind(member.group_id())
            .bind(member.name())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    anyhow::anyhow!(
                        "A member named '{}' already exists in this group",
                        member.name()
                    )
                } else {
                    anyhow::Error::from(e).context("Unable to insert member")
                }
            })?;
        Ok(())
    }

    pub(crate) async fn list_members(&self, group_id: &str) -> Result<Vec<Member>> {
        let rows =
            sqlx::query("SELECT id, group_id, name FROM members WHERE group_id = ? ORDER BY name")
                .bind(group_id)
                .fetch_all(&self.pool)
                .await
                .context("Unable to list members")?;
        rows.into_iter().map(member_from_row).collect()
    }

    pub(crate) async fn find_member_by_name(
        &self,
        group_id: &str,
        name: &str,
    ) -> Result<Option<Member>> {
        let row = sqlx::query("SELECT id, group_id, name FROM members WHERE group_id = ? AND name = ?")
            .bind(group_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to query members")?;
        row.map(member_from_row).transpose()
    }

    /// True if the member appears on any expense, as payer or as a share.
    pub(crate) async fn member_has_expenses(&self, member_id: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM expenses WHERE payer_id = ?1)
              + (SELECT COUNT(*) FROM expense_shares WHERE member_id = ?1) AS refs",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await
        .context("Unable to count member references")?;
        let refs: i64 = row.try_get("refs")?;
        Ok(refs > 0)
    }

    pub(crate) async fn delete_member(&self, member_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .context("Unable to delete member")?;
        Ok(())
    }

    // ==================== expenses ====================

    /// Inserts an expense and its shares in one transaction.
    pub(crate) async fn insert_expense(&self, expense: &Expense) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Unable to begin transaction")?;

        sqlx::query(
            "INSERT INTO expenses
                (id, group_id, title, description, category, amount, payer_id, split_method, date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(expense.id())
        .bind(expense.group_id())
        .bind(expense.title())
        .bind(expense.description())
        .bind(expense.category().to_string())
        .bind(expense.amount().to_string())
        .bind(expense.payer_id())
        .bind(expense.split_method().to_string())
        .bind(expense.date().to_string())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Unable to insert expense '{}'", expense.title()))?;

        for (position, share) in expense.splits().iter().enumerate() {
            sqlx::query(
                "INSERT INTO expense_shares (expense_id, member_id, position, raw_value, amount)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(expense.id())
            .bind(share.member_id())
            .bind(position as i64)
            .bind(share.raw_value().to_string())
            .bind(share.amount().to_string())
            .execute(&mut *tx)
            .await
            .context("Unable to insert expense share")?;
        }

        tx.commit().await.context("Unable to commit expense insert")?;
        Ok(())
    }

    /// Replaces a stored expense with a re-validated one, shares included.
    pub(crate) async fn update_expense(&self, expense: &Expense) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Unable to begin transaction")?;

        let result = sqlx::query(
            "UPDATE expenses SET
                title = ?, description = ?, category = ?, amount = ?,
                payer_id = ?, split_method = ?, date = ?
             WHERE id = ?",
        )
        .bind(expense.title())
        .bind(expense.description())
        .bind(expense.category().to_string())
        .bind(expense.amount().to_string())
        .bind(expense.payer_id())
        .bind(expense.split_method().to_string())
        .bind(expense.date().to_string())
        .bind(expense.id())
        .execute(&mut *tx)
        .await
        .context("Unable to update expense")?;

        if result.rows_affected() == 0 {
            bail!("No expense found with id '{}'", expense.id());
        }

        sqlx::query("DELETE FROM expense_shares WHERE expense_id = ?")
            .bind(expense.id())
            .execute(&mut *tx)
            .await
            .context("Unable to clear old expense shares")?;

        for (position, share) in expense.splits().iter().enumerate() {
            sqlx::query(
                "INSERT INTO expense_shares (expense_id, member_id, position, raw_value, amount)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(expense.id())
            .bind(share.member_id())
            .bind(position as i64)
            .bind(share.raw_value().to_string())
            .bind(share.amount().to_string())
            .execute(&mut *tx)
            .await
            .context("Unable to insert expense share")?;
        }

        tx.commit().await.context("Unable to commit expense update")?;
        Ok(())
    }

    pub(crate) async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        let row = sqlx::query(
            "SELECT id, group_id, title, description, category, amount, payer_id, split_method, date
             FROM expenses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Unable to query expenses")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let shares = self.load_shares(id).await?;
        Ok(Some(expense_from_row(row, shares)?))
    }

    /// Lists a group's expenses, newest first.
    pub(crate) async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            "SELECT id, group_id, title, description, category, amount, payer_id, split_method, date
             FROM expenses WHERE group_id = ? ORDER BY date DESC, id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .context("Unable to list expenses")?;

        let mut expenses = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let shares = self.load_shares(&id).await?;
            expenses.push(expense_from_row(row, shares)?);
        }
        Ok(expenses)
    }

    pub(crate) async fn delete_expense(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Unable to delete expense")?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_shares(&self, expense_id: &str) -> Result<Vec<SplitEntry>> {
        let rows = sqlx::query(
            "SELECT member_id, raw_value, amount FROM expense_shares
             WHERE expense_id = ? ORDER BY position",
        )
        .bind(expense_id)
        .fetch_all(&self.pool)
        .await
        .context("Unable to load expense shares")?;
        rows.into_iter().map(share_from_row).collect()
    }
}

fn group_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Group> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let currency: String = row.try_get("currency")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Group::from_parts(
        id,
        name,
        Currency::from_str(&currency)
            .map_err(|e| anyhow::anyhow!("Invalid stored currency: {e}"))?,
        DateTime::parse_from_rfc3339(&created_at)
            .context("Invalid stored group timestamp")?
            .with_timezone(&Utc),
    ))
}

fn member_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Member> {
    let id: String = row.try_get("id")?;
    let group_id: String = row.try_get("group_id")?;
    let name: String = row.try_get("name")?;
    Ok(Member::from_parts(id, group_id, name))
}

fn share_from_row(row: sqlx::sqlite::SqliteRow) -> Result<SplitEntry> {
    let member_id: String = row.try_get("member_id")?;
    let raw_value: String = row.try_get("raw_value")?;
    let amount: String = row.try_get("amount")?;
    Ok(SplitEntry {
        member_id,
        raw_value: Decimal::from_str(&raw_value).context("Invalid stored raw split value")?,
        amount: Amount::from_str(&amount).context("Invalid stored share amount")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::{Amount, ExpenseCategory, ExpenseDraft, SplitInput, SplitMethod};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_group_round_trip() {
        let env = TestEnv::new().await;
        let group_id = env.create_group("Trip", &["alice"]).await;

        let by_id = env.config().db().get_group(&group_id).await.unwrap().unwrap();
        let by_name = env
            .config()
            .db()
            .find_group_by_name("Trip")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.name(), "Trip");
    }

    #[tokio::test]
    async fn test_expense_round_trip_preserves_shares_and_raw_values() {
        let env = TestEnv::new().await;
        let group_id = env.create_group("Trip", &["alice", "bob", "carol"]).await;
        let members = env.config().db().list_members(&group_id).await.unwrap();

        let draft = ExpenseDraft {
            group_id: group_id.clone(),
            title: "Hotel".to_string(),
            description: Some("Two nights".to_string()),
            category: ExpenseCategory::Accommodation,
            amount: Amount::from_minor_units(10000),
            payer_id: members[0].id().to_string(),
            split_method: SplitMethod::Shares,
            participants: members
                .iter()
                .zip([Decimal::ONE, Decimal::ONE, Decimal::TWO])
                .map(|(m, w)| SplitInput::new(m.id(), w))
                .collect(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        let expense = draft.validate().unwrap();
        env.config().db().insert_expense(&expense).await.unwrap();

        let reloaded = env
            .config()
            .db()
            .get_expense(expense.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded, expense);
    }

    #[tokio::test]
    async fn test_get_expense_unknown_id() {
        let env = TestEnv::new().await;
        assert!(env
            .config()
            .db()
            .get_expense("nope")
            .await
            .unwrap()
            .is_none());
    }
}

fn expense_from_row(row: sqlx::sqlite::SqliteRow, splits: Vec<SplitEntry>) -> Result<Expense> {
    let id: String = row.try_get("id")?;
    let group_id: String = row.try_get("group_id")?;
    let title: String = row.try_get("title")?;
    let description: Option<String> = row.try_get("description")?;
    let category: String = row.try_get("category")?;
    let amount: String = row.try_get("amount")?;
    let payer_id: String = row.try_get("payer_id")?;
    let split_method: String = row.try_get("split_method")?;
    let date: String = row.try_get("date")?;

    Ok(Expense::from_parts(
        id,
        group_id,
        title,
        description,
        ExpenseCategory::from_str(&category)
            .map_err(|e| anyhow::anyhow!("Invalid stored expense category: {e}"))?,
        Amount::from_str(&amount).context("Invalid stored expense amount")?,
        payer_id,
        SplitMethod::from_str(&split_method)
            .map_err(|e| anyhow::anyhow!("Invalid stored split method: {e}"))?,
        NaiveDate::from_str(&date).context("Invalid stored expense date")?,
        splits,
    ))
}
