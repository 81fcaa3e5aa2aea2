//! Command handlers for the splitbill CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod balances;
mod expense;
mod group;
mod init;
mod summary;

use crate::model::Group;
use crate::{Config, Result};
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use balances::{balances, settle};
pub use expense::{add_expense, delete_expense, edit_expense, list_expenses, show_expense};
pub use group::{add_member, create_group, list_groups, list_members, remove_member};
pub use init::init;
pub use summary::summary;

/// The output type for a command. This allows the command to return a
/// consistent message and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the
    /// command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as
    /// JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Looks up a group by name, failing with a user-facing message if it does
/// not exist.
pub(crate) async fn require_group(config: &Config, name: &str) -> Result<Group> {
    match config.db().find_group_by_name(name).await? {
        Some(group) => Ok(group),
        None => bail!("No group named '{name}' exists. Create it with 'splitbill group create'."),
    }
}
