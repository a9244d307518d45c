//! The closed set of capability variants.

use serde::{Deserialize, Serialize};
use tracing::debug;

use fileplan_core::{NodeRef, Result};

use super::{
    AccessDecision, CompositeCapability, CreateCapability, DeclarativeCapability,
    EditCapability, FileRecordsCapability, MoveRecordsCapability, ReferencesCapability,
    UpdatePayload,
};
use crate::check::EvaluationContext;

/// Names of the capabilities other capabilities and the entry voter refer to.
pub mod names {
    pub const CREATE: &str = "Create";
    pub const DELETE: &str = "Delete";
    pub const MOVE_RECORDS: &str = "MoveRecords";
    pub const UPDATE: &str = "Update";
    pub const UPDATE_PROPERTIES: &str = "UpdateProperties";
    pub const FILE_RECORDS: &str = "FileRecords";
    pub const DECLARE: &str = "Declare";
    pub const CHANGE_OR_DELETE_REFERENCES: &str = "ChangeOrDeleteReferences";
    pub const DELETE_LINKS: &str = "DeleteLinks";
    pub const VIEW_UPDATE_REASONS_FOR_FREEZE: &str = "ViewUpdateReasonsForFreeze";
    pub const VIEW_RECORDS: &str = "ViewRecords";
    pub const MANAGE_ACCESS_CONTROLS: &str = "ManageAccessControls";
    pub const WRITE_CONTENT: &str = "WriteContent";
}

/// Identity and presentation of a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMeta {
    /// Unique name.
    pub name: String,

    /// Private capabilities are excluded from listings unless asked for.
    #[serde(default)]
    pub private: bool,

    /// Display title.
    #[serde(default)]
    pub title: Option<String>,

    /// Display group.
    #[serde(default)]
    pub group: Option<String>,
}

impl CapabilityMeta {
    /// Public, untitled and ungrouped.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            private: false,
            title: None,
            group: None,
        }
    }

    /// Mark as private.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Set the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the display group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A named capability.
///
/// Every variant shares the same requirement checks; the variants differ
/// in how they combine them and in the extra arguments they understand.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// Kinds, conditions and permissions.
    Declarative(DeclarativeCapability),

    /// First granting member wins.
    Composite(CompositeCapability),

    /// Creation and linking into a destination.
    Create(CreateCapability),

    /// Moving a node to a destination.
    MoveRecords(MoveRecordsCapability),

    /// Metadata editing with an ownership fallback.
    Edit(EditCapability),

    /// Reference changes between two file-plan components.
    References(ReferencesCapability),

    /// Filing, with escalation for closed and cut-off folders.
    FileRecords(FileRecordsCapability),
}

impl Capability {
    /// Identity and presentation.
    pub fn meta(&self) -> &CapabilityMeta {
        match self {
            Self::Declarative(c) => &c.meta,
            Self::Composite(c) => &c.meta,
            Self::Create(c) => &c.meta,
            Self::MoveRecords(c) => &c.meta,
            Self::Edit(c) => &c.meta,
            Self::References(c) => &c.meta,
            Self::FileRecords(c) => &c.meta,
        }
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.meta().name
    }

    /// Whether the capability is private.
    pub fn is_private(&self) -> bool {
        self.meta().private
    }

    /// The variant name, as used in catalogs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Declarative(_) => "declarative",
            Self::Composite(_) => "composite",
            Self::Create(_) => "create",
            Self::MoveRecords(_) => "move_records",
            Self::Edit(_) => "edit",
            Self::References(_) => "references",
            Self::FileRecords(_) => "file_records",
        }
    }

    /// Names of the capabilities this one delegates to, in order.
    pub fn delegates(&self) -> Vec<&str> {
        match self {
            Self::Composite(c) => c.members.iter().map(String::as_str).collect(),
            Self::Create(c) => c
                .fallbacks
                .iter()
                .map(|f| f.capability.as_str())
                .chain(c.references.as_deref())
                .collect(),
            Self::MoveRecords(c) => vec![c.delete_capability.as_str(), c.create_capability.as_str()],
            _ => Vec::new(),
        }
    }

    /// Names of the conditions this capability refers to.
    pub fn condition_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = match self {
            Self::Declarative(c) => c.requirements.conditions.keys().map(String::as_str).collect(),
            Self::Edit(c) => c.requirements.conditions.keys().map(String::as_str).collect(),
            Self::References(c) => c.requirements.conditions.keys().map(String::as_str).collect(),
            Self::FileRecords(c) => c
                .requirements
                .conditions
                .keys()
                .chain(c.stages.iter().flat_map(|s| s.conditions.keys()))
                .map(String::as_str)
                .collect(),
            Self::Create(c) => c
                .stages
                .iter()
                .flat_map(|s| s.conditions.keys())
                .map(String::as_str)
                .collect(),
            Self::Composite(_) | Self::MoveRecords(_) => Vec::new(),
        };
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Evaluate against a single node.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, node: &NodeRef) -> Result<AccessDecision> {
        match self {
            Self::Declarative(c) => c.evaluate(ctx, node),
            Self::Composite(c) => c.evaluate(ctx, node),
            Self::Create(c) => c.evaluate_create(ctx, node, None, None, None),
            Self::MoveRecords(c) => c.evaluate(ctx, node),
            Self::Edit(c) => c.evaluate(ctx, node),
            Self::References(_) => Ok(AccessDecision::Abstain),
            Self::FileRecords(c) => c.evaluate(ctx, node),
        }
    }

    /// Evaluate against a source node and an optional target node.
    ///
    /// Without a target, variants that can decide on one node fall back to
    /// [`Capability::evaluate`].
    pub fn evaluate_pair(
        &self,
        ctx: &EvaluationContext<'_>,
        source: &NodeRef,
        target: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        match self {
            Self::Declarative(c) => c.evaluate_pair(ctx, source, target),
            Self::Composite(c) => c.evaluate_pair(ctx, source, target),
            Self::Create(c) => c.evaluate_create(ctx, source, target, None, None),
            Self::MoveRecords(c) => c.evaluate_move(ctx, source, target),
            Self::References(c) => c.evaluate_pair(ctx, source, target),
            Self::Edit(_) | Self::FileRecords(_) => self.evaluate(ctx, source),
        }
    }

    /// Evaluate for an update of the node's aspects or properties.
    ///
    /// The payload is accepted but not inspected: changes to protected
    /// aspects and properties are not denied here.
    pub fn evaluate_update(
        &self,
        ctx: &EvaluationContext<'_>,
        node: &NodeRef,
        payload: &UpdatePayload,
    ) -> Result<AccessDecision> {
        if !payload.is_empty() {
            debug!(
                capability = self.name(),
                %node,
                aspects = payload.aspects.len(),
                properties = payload.properties.len(),
                "Update payload not inspected for protected changes"
            );
        }
        self.evaluate(ctx, node)
    }
}
