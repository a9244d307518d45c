//! Requirements declared by capabilities, held as data.

use fileplan_core::FilePlanComponentKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What a declarative capability requires of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Kinds the capability applies to; `None` means every node.
    #[serde(default)]
    pub kinds: Option<BTreeSet<FilePlanComponentKind>>,

    /// Condition name to the value it must evaluate to.
    #[serde(default)]
    pub conditions: BTreeMap<String, bool>,

    /// Permissions that must all be allowed on the node.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Requirements {
    /// No requirements at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given kinds.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = FilePlanComponentKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Require a condition to evaluate to `value`.
    pub fn condition(mut self, name: impl Into<String>, value: bool) -> Self {
        self.conditions.insert(name.into(), value);
        self
    }

    /// Require a permission.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }
}

/// Where a stage permission is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// On the evaluated node itself.
    #[default]
    Node,

    /// On the file plan containing the evaluated node.
    FilePlan,
}

/// One step of an escalating check: a condition set plus an optional
/// permission. The first stage that passes grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationStage {
    /// Condition name to required value.
    #[serde(default)]
    pub conditions: BTreeMap<String, bool>,

    /// Permission required in addition to the conditions.
    #[serde(default)]
    pub permission: Option<String>,

    /// Where the permission is checked.
    #[serde(default)]
    pub scope: PermissionScope,
}

impl EscalationStage {
    /// A stage requiring only conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a condition to evaluate to `value`.
    pub fn condition(mut self, name: impl Into<String>, value: bool) -> Self {
        self.conditions.insert(name.into(), value);
        self
    }

    /// Require `permission` on the node within `scope`.
    pub fn permission(mut self, permission: impl Into<String>, scope: PermissionScope) -> Self {
        self.permission = Some(permission.into());
        self.scope = scope;
        self
    }
}
