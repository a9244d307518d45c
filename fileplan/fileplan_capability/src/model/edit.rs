use fileplan_core::{run_as_system, NodeRef, Result};
use tracing::debug;

use super::{AccessDecision, CapabilityMeta, Requirements};
use crate::check::{check_conditions, check_kinds, check_permissions, EvaluationContext};

/// Metadata editing
///
/// Like a declarative capability, except that a principal lacking the
/// permissions is still granted when it owns the node. The owner is read
/// as the system principal so the lookup itself cannot be refused.
#[derive(Debug, Clone, PartialEq)]
pub struct EditCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Kinds, conditions and permissions
    pub requirements: Requirements,
}

impl EditCapability {
    /// Creates an edit capability
    pub fn new(meta: CapabilityMeta, requirements: Requirements) -> Self {
        Self { meta, requirements }
    }

    /// Evaluates editing one node
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, node: &NodeRef) -> Result<AccessDecision> {
        let services = ctx.services();
        let name = self.meta.name.as_str();

        if !services.records.is_file_plan_component(node)?
            || !check_kinds(ctx, node, self.requirements.kinds.as_ref())?
        {
            debug!(capability = name, %node, "Abstaining: not applicable");
            return Ok(AccessDecision::Abstain);
        }
        if !check_conditions(ctx, node, &self.requirements.conditions)? {
            debug!(capability = name, %node, "Denied: conditions not met");
            return Ok(AccessDecision::Denied);
        }
        if check_permissions(ctx, node, &self.requirements.permissions)? {
            return Ok(AccessDecision::Granted);
        }

        let user = services.identity.current_user();
        let owner = run_as_system(services.identity.as_ref(), || services.nodes.get_owner(node))?;
        match (user, owner) {
            (Some(user), Some(owner)) if user == owner => {
                debug!(capability = name, %node, user = %user, "Granted: owner");
                Ok(AccessDecision::Granted)
            }
            _ => {
                debug!(capability = name, %node, "Denied: permissions not allowed");
                Ok(AccessDecision::Denied)
            }
        }
    }
}
