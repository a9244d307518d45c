use std::collections::BTreeSet;

use fileplan_core::model::ASSOC_CONTAINS;
use fileplan_core::{NodeRef, QName, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AccessDecision, CapabilityMeta, EscalationStage};
use crate::check::{first_passing_stage, EvaluationContext};

/// A capability tried when the create stages do not grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    /// Capability evaluated against the destination
    pub capability: String,

    /// Node types the fallback applies to; `None` means every type
    #[serde(default)]
    pub applicable_types: Option<BTreeSet<QName>>,
}

impl Fallback {
    /// A fallback applying to every type
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            applicable_types: None,
        }
    }

    /// A fallback applying to the given types only
    pub fn typed(capability: impl Into<String>, types: impl IntoIterator<Item = QName>) -> Self {
        Self {
            capability: capability.into(),
            applicable_types: Some(types.into_iter().collect()),
        }
    }

    fn applies_to(&self, node_type: Option<&QName>) -> bool {
        match (&self.applicable_types, node_type) {
            (None, _) => true,
            (Some(types), Some(node_type)) => types.contains(node_type),
            (Some(_), None) => false,
        }
    }
}

/// Creating a node in, or linking a node into, a destination
///
/// The decision runs through these steps, the first that decides wins:
///
/// 1. a linkee the principal cannot read is denied;
/// 2. for file-plan destinations, linking an undeclared record through a
///    non-containment association is granted with the link permission;
/// 3. for file-plan destinations, the escalation stages are tried in order;
/// 4. the fallback capabilities are tried in order against the destination;
/// 5. the references capability is tried against the destination and linkee.
///
/// Anything else is denied.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Permission the principal needs on a linkee
    pub linkee_permission: String,

    /// Permission on the destination that allows linking undeclared records
    pub link_permission: String,

    /// Escalating condition sets checked on the destination
    pub stages: Vec<EscalationStage>,

    /// Capabilities tried after the stages, in order
    pub fallbacks: Vec<Fallback>,

    /// Capability tried last, with the destination and linkee as a pair
    pub references: Option<String>,
}

impl CreateCapability {
    /// Evaluates a create or link into `destination`
    pub fn evaluate_create(
        &self,
        ctx: &EvaluationContext<'_>,
        destination: &NodeRef,
        linkee: Option<&NodeRef>,
        node_type: Option<&QName>,
        assoc_type: Option<&QName>,
    ) -> Result<AccessDecision> {
        let services = ctx.services();
        let name = self.meta.name.as_str();

        if let Some(linkee) = linkee {
            let status = services
                .permissions
                .has_permission(linkee, &self.linkee_permission)?;
            if !status.is_allowed() {
                debug!(capability = name, %linkee, "Denied: linkee not readable");
                return Ok(AccessDecision::Denied);
            }
        }

        if services.records.is_file_plan_component(destination)? {
            if let (Some(linkee), Some(assoc_type)) = (linkee, assoc_type) {
                if *assoc_type != ASSOC_CONTAINS
                    && services.records.is_record(linkee)?
                    && !services.records.is_declared(linkee)?
                    && services
                        .permissions
                        .has_permission(destination, &self.link_permission)?
                        .is_allowed()
                {
                    debug!(capability = name, %destination, %linkee, "Granted: record link");
                    return Ok(AccessDecision::Granted);
                }
            }

            if let Some(stage) = first_passing_stage(ctx, destination, &self.stages)? {
                debug!(capability = name, %destination, stage, "Granted by stage");
                return Ok(AccessDecision::Granted);
            }
        }

        for fallback in &self.fallbacks {
            if !fallback.applies_to(node_type) {
                continue;
            }
            if ctx.evaluate(&fallback.capability, destination)?.is_granted() {
                debug!(
                    capability = name,
                    fallback = %fallback.capability,
                    %destination,
                    "Granted by fallback"
                );
                return Ok(AccessDecision::Granted);
            }
        }

        if let Some(references) = &self.references {
            if ctx
                .evaluate_pair(references, destination, linkee)?
                .is_granted()
            {
                return Ok(AccessDecision::Granted);
            }
        }

        debug!(capability = name, %destination, "Denied: no create path granted");
        Ok(AccessDecision::Denied)
    }
}
