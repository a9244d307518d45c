//! # Fileplan Capability
//!
//! `fileplan_capability` decides whether the current principal may perform
//! a named action on a file-plan node. Capabilities compose named
//! conditions and permission checks and return one of four decisions.
//!
//! Key concepts:
//!
//! 1. **Access Decision**: Granted, Denied, Abstain (the capability does
//!    not apply to the node) or Undetermined (the decision needs a second
//!    node that was not supplied).
//!
//! 2. **Condition**: A named predicate over one node, such as "closed" or
//!    "frozen".
//!
//! 3. **Capability**: A named combination of applicable kinds, required
//!    condition values and required permissions. Some variants delegate to
//!    other capabilities by name.
//!
//! 4. **Catalog**: The TOML description of conditions, capabilities and
//!    roles installed into the registries at start-up.

pub mod catalog;
pub mod check;
pub mod condition;
pub mod model;
pub mod registry;
pub mod role;

// Re-export key types for convenience
pub use catalog::{Catalog, DEFAULT_CATALOG};
pub use check::{AuditEntry, AuditLog, CapabilityService, EvaluationContext};
pub use condition::{Condition, ConditionRegistry};
pub use model::{names, AccessDecision, Capability, CapabilityMeta, UpdatePayload};
pub use registry::CapabilityRegistry;
pub use role::{Role, RoleRegistry};
