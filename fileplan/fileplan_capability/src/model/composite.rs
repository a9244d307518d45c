use fileplan_core::{NodeRef, Result};

use super::{AccessDecision, CapabilityMeta};
use crate::check::EvaluationContext;

/// A capability that grants when any of its members grants
///
/// Members are evaluated in order and evaluation stops at the first grant.
/// When no member grants, the first member opinion that is not an
/// abstention is returned; when all abstain, the composite abstains.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Member capability names, in evaluation order
    pub members: Vec<String>,
}

impl CompositeCapability {
    /// Creates a composite capability
    pub fn new(meta: CapabilityMeta, members: Vec<String>) -> Self {
        Self { meta, members }
    }

    /// Evaluates the members against one node
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, node: &NodeRef) -> Result<AccessDecision> {
        AccessDecision::first_granted(
            self.members
                .iter()
                .map(|member| ctx.evaluate(member, node)),
        )
    }

    /// Evaluates the members against a source and optional target
    pub fn evaluate_pair(
        &self,
        ctx: &EvaluationContext<'_>,
        source: &NodeRef,
        target: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        AccessDecision::first_granted(
            self.members
                .iter()
                .map(|member| ctx.evaluate_pair(member, source, target)),
        )
    }
}
