//! Node-level data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::id::NodeRef;
use crate::qname::QName;

/// A property value as stored on a repository node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Explicit null.
    Null,

    /// Boolean value.
    Bool(bool),

    /// Integer value.
    Integer(i64),

    /// Date value.
    Date(DateTime<Utc>),

    /// Text value.
    Text(String),

    /// Node reference value.
    Node(NodeRef),

    /// Multi-valued property.
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// The boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The date value, if this is a date.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// A set of property changes keyed by property name.
pub type PropertyMap = HashMap<QName, PropertyValue>;

/// A parent/child association between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildAssociation {
    /// The parent node.
    pub parent: NodeRef,

    /// The child node.
    pub child: NodeRef,

    /// The association type, e.g. `cm:contains`.
    pub assoc_type: QName,

    /// Whether this is the child's primary parent association.
    pub is_primary: bool,
}

/// Coarse classification of a file-plan component.
///
/// Capabilities declare the kinds they apply to; a node whose kind is not
/// in that set makes the capability abstain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePlanComponentKind {
    FilePlan,
    RecordCategory,
    RecordFolder,
    Record,
    HoldContainer,
    Hold,
    TransferContainer,
    Transfer,
    UnfiledRecordContainer,
    UnfiledRecordFolder,
    DispositionSchedule,
    DispositionActionDefinition,
}

impl FilePlanComponentKind {
    /// All kinds, in declaration order.
    pub const ALL: [FilePlanComponentKind; 12] = [
        Self::FilePlan,
        Self::RecordCategory,
        Self::RecordFolder,
        Self::Record,
        Self::HoldContainer,
        Self::Hold,
        Self::TransferContainer,
        Self::Transfer,
        Self::UnfiledRecordContainer,
        Self::UnfiledRecordFolder,
        Self::DispositionSchedule,
        Self::DispositionActionDefinition,
    ];

    /// The configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilePlan => "file_plan",
            Self::RecordCategory => "record_category",
            Self::RecordFolder => "record_folder",
            Self::Record => "record",
            Self::HoldContainer => "hold_container",
            Self::Hold => "hold",
            Self::TransferContainer => "transfer_container",
            Self::Transfer => "transfer",
            Self::UnfiledRecordContainer => "unfiled_record_container",
            Self::UnfiledRecordFolder => "unfiled_record_folder",
            Self::DispositionSchedule => "disposition_schedule",
            Self::DispositionActionDefinition => "disposition_action_definition",
        }
    }
}

impl fmt::Display for FilePlanComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilePlanComponentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown file plan component kind '{}'", s)))
    }
}
