use fileplan_core::{NodeRef, Result};
use tracing::debug;

use super::{AccessDecision, CapabilityMeta, Requirements};
use crate::check::{evaluate_requirements, EvaluationContext};

/// A capability decided entirely by its declared requirements
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarativeCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Kinds, conditions and permissions
    pub requirements: Requirements,
}

impl DeclarativeCapability {
    /// Creates a declarative capability
    pub fn new(meta: CapabilityMeta, requirements: Requirements) -> Self {
        Self { meta, requirements }
    }

    /// Evaluates the requirements against one node
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, node: &NodeRef) -> Result<AccessDecision> {
        evaluate_requirements(ctx, &self.meta.name, &self.requirements, node)
    }

    /// Evaluates the requirements against both nodes
    ///
    /// The source decides applicability; the target must then pass the
    /// same requirements for the pair to be granted.
    pub fn evaluate_pair(
        &self,
        ctx: &EvaluationContext<'_>,
        source: &NodeRef,
        target: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        let decision = self.evaluate(ctx, source)?;
        let target = match target {
            Some(target) if decision.is_granted() => target,
            _ => return Ok(decision),
        };

        if self.evaluate(ctx, target)?.is_granted() {
            Ok(AccessDecision::Granted)
        } else {
            debug!(capability = %self.meta.name, %source, %target, "Denied: target rejected");
            Ok(AccessDecision::Denied)
        }
    }
}
