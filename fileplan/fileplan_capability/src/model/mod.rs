//! Capability model.
//!
//! Capabilities are a closed set of variants dispatched by `match`. Their
//! requirements are plain data interpreted by the shared checks in
//! [`crate::check`].

pub mod capability;
pub mod composite;
pub mod create;
pub mod decision;
pub mod declarative;
pub mod edit;
pub mod file_records;
pub mod move_records;
pub mod references;
pub mod requirements;
pub mod update;

pub use capability::{names, Capability, CapabilityMeta};
pub use composite::CompositeCapability;
pub use create::{CreateCapability, Fallback};
pub use decision::AccessDecision;
pub use declarative::DeclarativeCapability;
pub use edit::EditCapability;
pub use file_records::FileRecordsCapability;
pub use move_records::MoveRecordsCapability;
pub use references::ReferencesCapability;
pub use requirements::{EscalationStage, PermissionScope, Requirements};
pub use update::UpdatePayload;
