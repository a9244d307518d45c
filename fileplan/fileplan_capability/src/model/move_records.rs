use std::collections::BTreeSet;

use fileplan_core::{FilePlanComponentKind, NodeRef, Result};
use tracing::debug;

use super::{AccessDecision, CapabilityMeta};
use crate::check::{check_kinds, EvaluationContext};

/// Moving a node into a destination
///
/// Without a destination the answer is undetermined. With one, the
/// principal must be able to read and delete the movee and to create it in
/// the destination; file-plan components also need the move permission.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecordsCapability {
    /// Identity and presentation
    pub meta: CapabilityMeta,

    /// Kinds of movee the capability applies to; `None` means every node
    pub kinds: Option<BTreeSet<FilePlanComponentKind>>,

    /// Permission needed to read the movee
    pub read_permission: String,

    /// Capability deciding deletion of a file-plan movee
    pub delete_capability: String,

    /// Permission deciding deletion of any other movee
    pub delete_permission: String,

    /// Create capability evaluated against the destination
    pub create_capability: String,

    /// Permission a file-plan movee needs in addition
    pub move_permission: String,
}

impl MoveRecordsCapability {
    /// Single-node form: the destination is unknown
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, movee: &NodeRef) -> Result<AccessDecision> {
        self.evaluate_move(ctx, movee, None)
    }

    /// Evaluates moving `movee` into `destination`
    pub fn evaluate_move(
        &self,
        ctx: &EvaluationContext<'_>,
        movee: &NodeRef,
        destination: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        let services = ctx.services();
        let name = self.meta.name.as_str();

        if !check_kinds(ctx, movee, self.kinds.as_ref())? {
            debug!(capability = name, %movee, "Abstaining: kind not applicable");
            return Ok(AccessDecision::Abstain);
        }

        let destination = match destination {
            Some(destination) => destination,
            None => return Ok(AccessDecision::Undetermined),
        };

        if !services
            .permissions
            .has_permission(movee, &self.read_permission)?
            .is_allowed()
        {
            debug!(capability = name, %movee, "Denied: movee not readable");
            return Ok(AccessDecision::Denied);
        }

        let is_component = services.records.is_file_plan_component(movee)?;
        let can_delete = if is_component {
            ctx.evaluate(&self.delete_capability, movee)?.is_granted()
        } else {
            services
                .permissions
                .has_permission(movee, &self.delete_permission)?
                .is_allowed()
        };
        if !can_delete {
            debug!(capability = name, %movee, "Denied: movee cannot be deleted");
            return Ok(AccessDecision::Denied);
        }

        let movee_type = services.nodes.get_type(movee)?;
        let create = ctx.evaluate_create(
            &self.create_capability,
            destination,
            None,
            Some(&movee_type),
            None,
        )?;
        if !create.is_granted() {
            debug!(capability = name, %destination, "Denied: cannot create in destination");
            return Ok(AccessDecision::Denied);
        }

        if is_component
            && !services
                .permissions
                .has_permission(movee, &self.move_permission)?
                .is_allowed()
        {
            debug!(capability = name, %movee, "Denied: move permission not allowed");
            return Ok(AccessDecision::Denied);
        }

        Ok(AccessDecision::Granted)
    }
}
