//! Capability evaluation.
//!
//! - **requirements**: the kind, condition, permission and stage checks
//!   shared by all capability variants
//! - **context**: per-evaluation state with the delegation depth guard
//! - **service**: the evaluation entry point
//! - **audit**: a bounded log of top-level evaluations

pub mod audit;
pub mod context;
pub mod requirements;
pub mod service;

pub use audit::{AuditEntry, AuditLog};
pub use context::EvaluationContext;
pub use requirements::{
    check_conditions, check_kinds, check_permissions, check_stage, evaluate_requirements,
    first_passing_stage,
};
pub use service::CapabilityService;
