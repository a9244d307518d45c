//! Requirement checks shared by every capability variant.
//!
//! Capabilities hold their requirements as data; these functions interpret
//! them. Order matters: kinds first (mismatch abstains), then conditions,
//! then permissions (either failing denies).

use std::collections::{BTreeMap, BTreeSet};

use fileplan_core::{FilePlanComponentKind, NodeRef, Result};
use tracing::{debug, trace};

use super::context::EvaluationContext;
use crate::model::{AccessDecision, EscalationStage, PermissionScope, Requirements};

/// Whether the node's kind is in `kinds`; `None` accepts every node.
pub fn check_kinds(
    ctx: &EvaluationContext<'_>,
    node: &NodeRef,
    kinds: Option<&BTreeSet<FilePlanComponentKind>>,
) -> Result<bool> {
    let kinds = match kinds {
        Some(kinds) => kinds,
        None => return Ok(true),
    };
    let kind = ctx.services().records.get_file_plan_component_kind(node)?;
    Ok(kind.map_or(false, |kind| kinds.contains(&kind)))
}

/// Whether every named condition evaluates to its required value.
///
/// Stops at the first mismatch. Unknown condition names are errors.
pub fn check_conditions(
    ctx: &EvaluationContext<'_>,
    node: &NodeRef,
    conditions: &BTreeMap<String, bool>,
) -> Result<bool> {
    for (name, required) in conditions {
        let actual = ctx.conditions().evaluate(name, ctx.services(), node)?;
        if actual != *required {
            trace!(condition = %name, required, actual, %node, "Condition not met");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether every permission is allowed on the node.
pub fn check_permissions(
    ctx: &EvaluationContext<'_>,
    node: &NodeRef,
    permissions: &[String],
) -> Result<bool> {
    for permission in permissions {
        let status = ctx.services().permissions.has_permission(node, permission)?;
        if !status.is_allowed() {
            trace!(permission = %permission, %status, %node, "Permission not allowed");
            return Ok(false);
        }
    }
    Ok(true)
}

/// The declarative evaluation: kinds, then conditions, then permissions.
pub fn evaluate_requirements(
    ctx: &EvaluationContext<'_>,
    capability: &str,
    requirements: &Requirements,
    node: &NodeRef,
) -> Result<AccessDecision> {
    if !check_kinds(ctx, node, requirements.kinds.as_ref())? {
        debug!(capability, %node, "Abstaining: kind not applicable");
        return Ok(AccessDecision::Abstain);
    }
    if !check_conditions(ctx, node, &requirements.conditions)? {
        debug!(capability, %node, "Denied: conditions not met");
        return Ok(AccessDecision::Denied);
    }
    if !check_permissions(ctx, node, &requirements.permissions)? {
        debug!(capability, %node, "Denied: permissions not allowed");
        return Ok(AccessDecision::Denied);
    }
    Ok(AccessDecision::Granted)
}

/// Whether one escalation stage passes on the node.
pub fn check_stage(
    ctx: &EvaluationContext<'_>,
    node: &NodeRef,
    stage: &EscalationStage,
) -> Result<bool> {
    if !check_conditions(ctx, node, &stage.conditions)? {
        return Ok(false);
    }
    let permission = match &stage.permission {
        Some(permission) => permission,
        None => return Ok(true),
    };
    let target = match stage.scope {
        PermissionScope::Node => *node,
        PermissionScope::FilePlan => match ctx.services().records.get_file_plan(node)? {
            Some(plan) => plan,
            None => return Ok(false),
        },
    };
    Ok(ctx
        .services()
        .permissions
        .has_permission(&target, permission)?
        .is_allowed())
}

/// Index of the first stage that passes, if any.
pub fn first_passing_stage(
    ctx: &EvaluationContext<'_>,
    node: &NodeRef,
    stages: &[EscalationStage],
) -> Result<Option<usize>> {
    for (index, stage) in stages.iter().enumerate() {
        if check_stage(ctx, node, stage)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
