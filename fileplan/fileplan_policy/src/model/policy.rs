//! Entry policy names.

use std::fmt;
use std::str::FromStr;

use fileplan_core::error::PolicyError;
use serde::{Deserialize, Serialize};

/// A named entry policy, referenced from `RM.<policy>` directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPolicy {
    /// Reading a node.
    Read,

    /// Creating or linking a node into a destination.
    Create,

    /// Moving a node into a destination.
    Move,

    /// Changing a node's aspects or properties.
    Update,

    /// Deleting a node.
    Delete,

    /// Setting properties.
    UpdateProperties,

    /// Reading associations.
    Assoc,

    /// Writing content.
    WriteContent,

    /// Changing permissions.
    Capability,

    /// Declaring a record.
    Declare,

    /// Reading a single property.
    ReadProperty,
}

impl EntryPolicy {
    /// Every policy, in declaration order.
    pub const ALL: [EntryPolicy; 11] = [
        Self::Read,
        Self::Create,
        Self::Move,
        Self::Update,
        Self::Delete,
        Self::UpdateProperties,
        Self::Assoc,
        Self::WriteContent,
        Self::Capability,
        Self::Declare,
        Self::ReadProperty,
    ];

    /// The name used in directives.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Create => "Create",
            Self::Move => "Move",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::UpdateProperties => "UpdateProperties",
            Self::Assoc => "Assoc",
            Self::WriteContent => "WriteContent",
            Self::Capability => "Capability",
            Self::Declare => "Declare",
            Self::ReadProperty => "ReadProperty",
        }
    }
}

impl fmt::Display for EntryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntryPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|policy| policy.name() == s)
            .copied()
            .ok_or_else(|| PolicyError::UnknownPolicy(s.to_string()))
    }
}
