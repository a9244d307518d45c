//! Collaborator traits.
//!
//! The engine never owns nodes, permissions, holds or schedules. It reads
//! them through these traits, which the host repository implements. All
//! lookups are fallible; errors are propagated to the caller unchanged.

pub mod identity;
pub mod repository;

pub use identity::{run_as, run_as_system, AuthenticationStack, ElevationGuard, IdentityContext};
pub use repository::{
    DictionaryLookup, DispositionLookup, HoldLookup, NodeLookup, PermissionLookup,
    RecordClassification,
};
