//! Evaluation context.
//!
//! Carries the collaborators and registries through one top-level
//! evaluation and tracks how deep capabilities have delegated to one
//! another.

use std::sync::Arc;

use fileplan_core::error::CapabilityError;
use fileplan_core::{LogLevel, NodeRef, QName, Result, Services};
use tracing::debug;

use crate::condition::ConditionRegistry;
use crate::model::{AccessDecision, Capability, UpdatePayload};
use crate::registry::CapabilityRegistry;

/// Per-evaluation state
///
/// Cheap to copy; a delegated evaluation gets a copy one level deeper.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    services: &'a Services,
    conditions: &'a ConditionRegistry,
    capabilities: &'a CapabilityRegistry,
    depth: usize,
    max_depth: usize,
    log_level: LogLevel,
}

impl<'a> EvaluationContext<'a> {
    /// A top-level context
    pub fn new(
        services: &'a Services,
        conditions: &'a ConditionRegistry,
        capabilities: &'a CapabilityRegistry,
        max_depth: usize,
    ) -> Self {
        Self {
            services,
            conditions,
            capabilities,
            depth: 0,
            max_depth,
            log_level: LogLevel::default(),
        }
    }

    /// Emit delegation events when `level` enables debug output
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Host collaborators
    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// Named conditions
    pub fn conditions(&self) -> &'a ConditionRegistry {
        self.conditions
    }

    /// Number of capabilities on the current evaluation path
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Look up a capability and descend one level
    fn enter(&self, name: &str) -> Result<(Arc<Capability>, EvaluationContext<'a>)> {
        let capability = self.capabilities.get(name)?;
        if self.depth >= self.max_depth {
            return Err(CapabilityError::DelegationDepthExceeded {
                capability: name.to_string(),
                depth: self.max_depth,
            }
            .into());
        }
        if self.depth > 0 && self.log_level.enables(LogLevel::Debug) {
            debug!(capability = name, depth = self.depth, "Delegating");
        }
        let child = Self {
            depth: self.depth + 1,
            ..*self
        };
        Ok((capability, child))
    }

    /// Evaluate the named capability against one node
    pub fn evaluate(&self, name: &str, node: &NodeRef) -> Result<AccessDecision> {
        let (capability, child) = self.enter(name)?;
        capability.evaluate(&child, node)
    }

    /// Evaluate the named capability against a source and optional target
    pub fn evaluate_pair(
        &self,
        name: &str,
        source: &NodeRef,
        target: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        let (capability, child) = self.enter(name)?;
        capability.evaluate_pair(&child, source, target)
    }

    /// Evaluate the named create capability
    pub fn evaluate_create(
        &self,
        name: &str,
        destination: &NodeRef,
        linkee: Option<&NodeRef>,
        node_type: Option<&QName>,
        assoc_type: Option<&QName>,
    ) -> Result<AccessDecision> {
        let (capability, child) = self.enter(name)?;
        match capability.as_ref() {
            Capability::Create(create) => {
                create.evaluate_create(&child, destination, linkee, node_type, assoc_type)
            }
            other => Err(CapabilityError::TypeMismatch {
                expected: "create".to_string(),
                actual: other.type_name().to_string(),
            }
            .into()),
        }
    }

    /// Evaluate the named capability for an update carrying a payload
    pub fn evaluate_update(
        &self,
        name: &str,
        node: &NodeRef,
        payload: &UpdatePayload,
    ) -> Result<AccessDecision> {
        let (capability, child) = self.enter(name)?;
        capability.evaluate_update(&child, node, payload)
    }
}
