//! Permission lookup results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The answer of the permission collaborator for one permission on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessStatus {
    /// The permission is held.
    Allowed,

    /// The permission is explicitly not held.
    Denied,

    /// The permission system has no answer.
    Undetermined,
}

impl AccessStatus {
    /// Whether this status is `Allowed`.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "ALLOWED"),
            Self::Denied => write!(f, "DENIED"),
            Self::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}
