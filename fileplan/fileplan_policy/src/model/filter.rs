//! Result filtering directives and returned values.
//!
//! Methods whose results must be filtered carry `AFTER_RM.<mode>[.parent]`
//! directives alongside their entry directives. Each one asks for the read
//! check to run on the returned node itself, or with `.parent` on the node
//! it hangs off.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use fileplan_core::error::PolicyError;
use fileplan_core::{ChildAssociation, NodeRef, PropertyValue, Result};
use serde::{Deserialize, Serialize};

const AFTER: &str = "AFTER_RM";

/// The mode under which collection entries are filtered.
pub const FILTER_NODE: &str = "FilterNode";

/// A parsed `AFTER_RM` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDirective {
    /// How the result is filtered; only `FilterNode` filters collections.
    pub mode: String,

    /// Test the parent or source rather than the returned node.
    pub parent: bool,
}

impl FilterDirective {
    /// Whether the result filter handles this directive.
    pub fn supports(directive: &str) -> bool {
        !directive.trim().is_empty() && directive.starts_with(AFTER)
    }

    /// Parse a supported directive.
    pub fn parse(directive: &str) -> Result<Self> {
        let mut tokens = directive.split('.');
        if tokens.next() != Some(AFTER) {
            return Err(invalid(directive, "must start with AFTER_RM"));
        }
        let mode = match tokens.next() {
            Some(mode) if !mode.is_empty() => mode.to_string(),
            _ => return Err(invalid(directive, "filter mode is missing")),
        };
        Ok(Self {
            mode,
            parent: tokens.next().is_some(),
        })
    }

    /// Parse the directives the result filter handles, skipping the rest.
    pub fn parse_all<S: AsRef<str>>(directives: &[S]) -> Result<Vec<Self>> {
        directives
            .iter()
            .map(|directive| directive.as_ref())
            .filter(|directive| Self::supports(directive))
            .map(Self::parse)
            .collect()
    }

    /// Whether collection entries are filtered under this directive.
    pub fn filters_entries(&self) -> bool {
        self.mode.eq_ignore_ascii_case(FILTER_NODE)
    }
}

impl fmt::Display for FilterDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", AFTER, self.mode)?;
        if self.parent {
            write!(f, ".parent")?;
        }
        Ok(())
    }
}

impl FromStr for FilterDirective {
    type Err = fileplan_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn invalid(directive: &str, reason: &str) -> fileplan_core::Error {
    PolicyError::InvalidDirective {
        directive: directive.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// The value a guarded method returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Returned {
    /// Nothing.
    Null,

    /// A node.
    Node(NodeRef),

    /// A parent-child association.
    ChildAssociation(ChildAssociation),

    /// A peer association from a source node to a target node.
    Association {
        /// The source node.
        source: NodeRef,

        /// The target node.
        target: NodeRef,
    },

    /// An ordered collection, such as a list of children or a result set.
    List(Vec<Returned>),

    /// Named collections, such as the result sets of a multi-store query.
    Map(BTreeMap<String, Returned>),

    /// A plain value carrying no node.
    Value(PropertyValue),
}

impl Returned {
    /// A short description of the value's shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Node(_) => "node",
            Self::ChildAssociation(_) => "child association",
            Self::Association { .. } => "association",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Value(_) => "value",
        }
    }

    /// The entries of a list, `None` for any other shape.
    pub fn as_list(&self) -> Option<&[Returned]> {
        match self {
            Self::List(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<NodeRef> for Returned {
    fn from(node: NodeRef) -> Self {
        Self::Node(node)
    }
}

impl From<ChildAssociation> for Returned {
    fn from(assoc: ChildAssociation) -> Self {
        Self::ChildAssociation(assoc)
    }
}

impl<T: Into<Returned>> From<Vec<T>> for Returned {
    fn from(entries: Vec<T>) -> Self {
        Self::List(entries.into_iter().map(Into::into).collect())
    }
}
