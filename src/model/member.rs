use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents one member of a group. The calculator and aggregator only care
/// about the id; the name exists for display.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Member {
    pub(crate) id: String,
    pub(crate) group_id: String,
    pub(crate) name: String,
}

impl Member {
    /// Creates a member with a freshly generated id.
    pub fn new(group_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            name: name.into(),
        }
    }

    /// Reconstructs a member from stored fields.
    pub fn from_parts(
        id: impl Into<String>,
        group_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
