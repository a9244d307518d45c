use fileplan_core::{NodeRef, QName, Result};
use tracing::debug;

use super::{AccessDecision, CapabilityMeta, EscalationStage, Requirements};
use crate::check::{
    check_conditions, check_kinds, check_permissions, first_passing_stage, EvaluationContext,
};

/// Filing into a node
///
/// Fileable content outside the file plan is decided by the filing
/// permission alone. File-plan components must pass the kinds, conditions
/// and permissions, then one of the escalation stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecordsCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Kinds, conditions and the gating permissions on the node
    pub requirements: Requirements,

    /// Types that can be filed without being file-plan components
    pub fileable_type: QName,

    /// Permission deciding fileable content
    pub fileable_permission: String,

    /// Escalating condition sets checked on the node
    pub stages: Vec<EscalationStage>,
}

impl FileRecordsCapability {
    /// Evaluates filing into one node
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, node: &NodeRef) -> Result<AccessDecision> {
        let services = ctx.services();
        let name = self.meta.name.as_str();

        if !services.records.is_file_plan_component(node)? {
            let node_type = services.nodes.get_type(node)?;
            if !services.dictionary.is_sub_class(&node_type, &self.fileable_type)? {
                debug!(capability = name, %node, "Abstaining: not fileable");
                return Ok(AccessDecision::Abstain);
            }
            let allowed = services
                .permissions
                .has_permission(node, &self.fileable_permission)?
                .is_allowed();
            return Ok(if allowed {
                AccessDecision::Granted
            } else {
                AccessDecision::Denied
            });
        }

        if !check_kinds(ctx, node, self.requirements.kinds.as_ref())? {
            debug!(capability = name, %node, "Abstaining: kind not applicable");
            return Ok(AccessDecision::Abstain);
        }
        if !check_conditions(ctx, node, &self.requirements.conditions)?
            || !check_permissions(ctx, node, &self.requirements.permissions)?
        {
            debug!(capability = name, %node, "Denied: requirements not met");
            return Ok(AccessDecision::Denied);
        }

        match first_passing_stage(ctx, node, &self.stages)? {
            Some(_) => Ok(AccessDecision::Granted),
            None => {
                debug!(capability = name, %node, "Denied: no stage passed");
                Ok(AccessDecision::Denied)
            }
        }
    }
}
