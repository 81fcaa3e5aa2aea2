//! These structs provide the CLI interface for the splitbill CLI.

use crate::model::{Amount, Currency, ExpenseCategory, SplitMethod};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// splitbill: A command-line tool for tracking shared group expenses.
///
/// The purpose of this program is to record the expenses a group of people
/// share, split each expense among its participants (equally, by custom
/// amounts, by percentages or by share weights), and compute who owes whom.
/// All data is stored in a local SQLite database in the splitbill home
/// directory.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty
    /// database.
    ///
    /// This is the first command you should run. By default the data
    /// directory is $HOME/splitbill; pass --home (or set SPLITBILL_HOME) to
    /// put it somewhere else.
    Init(InitArgs),
    /// Create and inspect groups and their members.
    Group(GroupArgs),
    /// Record, list, edit and delete expenses.
    Expense(ExpenseArgs),
    /// Show each member's net balance in a group.
    Balances(BalancesArgs),
    /// Suggest the payments that settle a group's balances.
    Settle(SettleArgs),
    /// Show aggregate figures for a group.
    Summary(SummaryArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where splitbill data and configuration is held.
    /// Defaults to ~/splitbill
    #[arg(long, env = "SPLITBILL_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `splitbill init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The default currency for new groups, e.g. USD or EUR.
    #[arg(long, default_value_t = Currency::Usd)]
    currency: Currency,
}

impl InitArgs {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

/// Args for the `splitbill group` command.
#[derive(Debug, Parser, Clone)]
pub struct GroupArgs {
    #[command(subcommand)]
    subcommand: GroupSubcommand,
}

impl GroupArgs {
    pub fn subcommand(&self) -> &GroupSubcommand {
        &self.subcommand
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GroupSubcommand {
    /// Create a new group, optionally with its initial members.
    Create(GroupCreateArgs),
    /// List all groups.
    List,
    /// List the members of a group.
    Members(GroupRefArgs),
    /// Add a member to a group.
    AddMember(MemberArgs),
    /// Remove a member from a group. Fails if the member appears on any
    /// expense.
    RemoveMember(MemberArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct GroupCreateArgs {
    /// The group name. Must be unique.
    name: String,

    /// The display currency for the group's amounts. Defaults to the
    /// configured default currency.
    #[arg(long)]
    currency: Option<Currency>,

    /// An initial member. Repeat for each member, e.g.
    /// --member alice --member bob
    #[arg(long = "member")]
    members: Vec<String>,
}

impl GroupCreateArgs {
    pub fn new(
        name: impl Into<String>,
        currency: Option<Currency>,
        members: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            currency,
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}

#[derive(Debug, Parser, Clone)]
pub struct GroupRefArgs {
    /// The group name.
    group: String,
}

impl GroupRefArgs {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

#[derive(Debug, Parser, Clone)]
pub struct MemberArgs {
    /// The group name.
    group: String,

    /// The member name.
    name: String,
}

impl MemberArgs {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `splitbill expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    subcommand: ExpenseSubcommand,
}

impl ExpenseArgs {
    pub fn subcommand(&self) -> &ExpenseSubcommand {
        &self.subcommand
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpenseSubcommand {
    /// Record a new expense.
    Add(Box<AddExpenseArgs>),
    /// List a group's expenses, newest first.
    List(GroupRefArgs),
    /// Show one expense in full, including its split.
    Show(ExpenseRefArgs),
    /// Edit an expense. The changed record is re-validated before it is
    /// stored.
    Edit(Box<EditExpenseArgs>),
    /// Delete an expense.
    Delete(ExpenseRefArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AddExpenseArgs {
    /// The group the expense belongs to.
    group: String,

    /// A short title, e.g. "Dinner".
    title: String,

    /// The total amount, e.g. 42.50
    #[arg(long)]
    amount: Amount,

    /// The member who fronted the money.
    #[arg(long)]
    payer: String,

    /// How to split the amount among the participants.
    #[arg(long, default_value_t = SplitMethod::Equal)]
    method: SplitMethod,

    /// A participant, as "name" for an equal split or "name=value" otherwise,
    /// where value is a monetary share (custom), a percentage (percentage) or
    /// a weight (shares). Repeat for each participant. If omitted entirely,
    /// an equal split across all group members is used.
    #[arg(long = "participant")]
    participants: Vec<String>,

    /// The expense category.
    #[arg(long, default_value_t = ExpenseCategory::Other)]
    category: ExpenseCategory,

    /// Free-form description.
    #[arg(long)]
    description: Option<String>,

    /// The expense date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl AddExpenseArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group: impl Into<String>,
        title: impl Into<String>,
        amount: Amount,
        payer: impl Into<String>,
        method: SplitMethod,
        participants: Vec<String>,
        category: ExpenseCategory,
        description: Option<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            amount,
            payer: payer.into(),
            method,
            participants,
            category,
            description,
            date,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn payer(&self) -> &str {
        &self.payer
    }

    pub fn method(&self) -> SplitMethod {
        self.method
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ExpenseRefArgs {
    /// The expense id.
    id: String,
}

impl ExpenseRefArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Parser, Clone)]
pub struct EditExpenseArgs {
    /// The expense id.
    id: String,

    /// A new title.
    #[arg(long)]
    title: Option<String>,

    /// A new total amount. The stored split inputs are re-validated against
    /// it; a custom split whose values no longer reconcile is rejected.
    #[arg(long)]
    amount: Option<Amount>,

    /// A new payer (member name).
    #[arg(long)]
    payer: Option<String>,

    /// A new category.
    #[arg(long)]
    category: Option<ExpenseCategory>,

    /// A new description.
    #[arg(long)]
    description: Option<String>,

    /// A new date as YYYY-MM-DD.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl EditExpenseArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        amount: Option<Amount>,
        payer: Option<String>,
        category: Option<ExpenseCategory>,
        description: Option<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            title,
            amount,
            payer,
            category,
            description,
            date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn payer(&self) -> Option<&str> {
        self.payer.as_deref()
    }

    pub fn category(&self) -> Option<ExpenseCategory> {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Args for the `splitbill balances` command.
#[derive(Debug, Parser, Clone)]
pub struct BalancesArgs {
    /// The group name.
    group: String,
}

impl BalancesArgs {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

/// Args for the `splitbill settle` command.
#[derive(Debug, Parser, Clone)]
pub struct SettleArgs {
    /// The group name.
    group: String,
}

impl SettleArgs {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

/// Args for the `splitbill summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// The group name.
    group: String,

    /// The month to report spending for, as YYYY-MM-DD (any day of the
    /// month). Defaults to today.
    #[arg(long)]
    month_of: Option<NaiveDate>,
}

impl SummaryArgs {
    pub fn new(group: impl Into<String>, month_of: Option<NaiveDate>) -> Self {
        Self {
            group: group.into(),
            month_of,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn month_of(&self) -> Option<NaiveDate> {
        self.month_of
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("splitbill"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SPLITBILL_HOME instead of relying on the default \
                splitbill home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("splitbill")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
