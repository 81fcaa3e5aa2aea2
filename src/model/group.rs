use crate::model::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a group of people sharing expenses.
///
/// The group record itself carries no derived data: member lists and balances
/// always come from their own tables and from recomputation, so a group can
/// never disagree with the expenses recorded against it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) currency: Currency,
    pub(crate) created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a group with a freshly generated id, stamped now.
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            currency,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a group from stored fields.
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        currency: Currency,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            currency,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
