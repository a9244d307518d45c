//! Disposition schedule data.
//!
//! Schedules and actions are owned by the external disposition service; the
//! engine only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::NodeRef;

/// One step of a disposition schedule, e.g. `cutoff` or `destroy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionActionDefinition {
    /// Action name.
    pub name: String,

    /// Position in the schedule.
    pub index: usize,
}

/// The retention schedule attached to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionSchedule {
    /// Node holding the schedule definition.
    pub node: NodeRef,

    /// Whether the schedule applies to individual records rather than folders.
    pub record_level: bool,

    /// The ordered action definitions.
    pub action_definitions: Vec<DispositionActionDefinition>,
}

impl DispositionSchedule {
    /// Find an action definition by name.
    pub fn action_definition(&self, name: &str) -> Option<&DispositionActionDefinition> {
        self.action_definitions.iter().find(|d| d.name == name)
    }
}

/// A pending or completed disposition action on a record or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionAction {
    /// Action name.
    pub name: String,

    /// Date the action becomes eligible.
    pub as_of: Option<DateTime<Utc>>,

    /// When the action was completed, if it was.
    pub completed_at: Option<DateTime<Utc>>,
}

impl DispositionAction {
    /// A pending action.
    pub fn pending(name: impl Into<String>, as_of: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            as_of,
            completed_at: None,
        }
    }

    /// A completed action.
    pub fn completed(name: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            as_of: None,
            completed_at: Some(completed_at),
        }
    }
}
