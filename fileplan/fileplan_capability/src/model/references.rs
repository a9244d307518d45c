use fileplan_core::{NodeRef, Result};
use tracing::debug;

use super::{AccessDecision, CapabilityMeta, Requirements};
use crate::check::{check_conditions, check_permissions, EvaluationContext};

/// Changing or deleting references between two file-plan components
///
/// A single node carries too little information, so the single-node form
/// always abstains. The pair form needs both nodes to be file-plan
/// components that each pass the conditions and permissions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencesCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Conditions and permissions checked on both nodes
    pub requirements: Requirements,
}

impl ReferencesCapability {
    /// Creates a references capability
    pub fn new(meta: CapabilityMeta, requirements: Requirements) -> Self {
        Self { meta, requirements }
    }

    /// Evaluates a reference from `source` to `target`
    pub fn evaluate_pair(
        &self,
        ctx: &EvaluationContext<'_>,
        source: &NodeRef,
        target: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        let target = match target {
            Some(target) => target,
            None => return Ok(AccessDecision::Abstain),
        };

        for node in [source, target] {
            if !ctx.services().records.is_file_plan_component(node)?
                || !check_conditions(ctx, node, &self.requirements.conditions)?
                || !check_permissions(ctx, node, &self.requirements.permissions)?
            {
                debug!(capability = %self.meta.name, %node, "Denied: reference end rejected");
                return Ok(AccessDecision::Denied);
            }
        }
        Ok(AccessDecision::Granted)
    }
}
