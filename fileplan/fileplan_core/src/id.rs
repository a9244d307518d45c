//! Strongly-typed identifiers for the file-plan engine.
//!
//! Every identifier is a thin wrapper around a UUID with a phantom type
//! parameter, so a node reference can never be confused with, say, an
//! audit entry identifier even though both share the same representation.
//!
//! # Examples
//!
//! ```
//! use fileplan_core::id::{EvaluationId, NodeRef};
//! use std::str::FromStr;
//!
//! let node = NodeRef::new();
//! let evaluation = EvaluationId::new();
//! assert_ne!(node.to_string(), evaluation.to_string());
//!
//! let parsed = NodeRef::from_str(&node.to_string()).unwrap();
//! assert_eq!(parsed, node);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A type-safe identifier based on UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Id<T> {
    uuid: Uuid,
    #[serde(skip)]
    _marker: std::marker::PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _marker: std::marker::PhantomData,
        }
    }

    /// A deterministic identifier, for fixtures that want stable references.
    pub fn from_u128(value: u128) -> Self {
        Self::from_uuid(Uuid::from_u128(value))
    }

    /// The underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

impl<T> FromStr for Id<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

/// Marker type for repository nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeMarker;
/// Reference to a node owned by the external repository.
///
/// Holds, folders, records and the file plan itself are all nodes.
pub type NodeRef = Id<NodeMarker>;

/// Marker type for recorded evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaluationMarker;
/// Identifier of an audited evaluation or vote.
pub type EvaluationId = Id<EvaluationMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_references_are_distinct() {
        assert_ne!(NodeRef::new(), NodeRef::new());
        assert_eq!(NodeRef::from_u128(7), NodeRef::from_u128(7));
    }

    #[test]
    fn test_parse_and_serialize() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let node = NodeRef::from_str(raw).unwrap();
        assert_eq!(node.to_string(), raw);
        assert_eq!(node.uuid(), Uuid::parse_str(raw).unwrap());

        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(serde_json::from_str::<NodeRef>(&json).unwrap(), node);
        assert!(NodeRef::from_str("node-1").is_err());
    }
}
