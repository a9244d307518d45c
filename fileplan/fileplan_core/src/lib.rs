//! # Fileplan Core
//!
//! `fileplan_core` provides the building blocks shared by the file-plan
//! capability engine and the entry voter: identifiers, qualified names, the
//! records-management vocabulary, the collaborator traits through which the
//! engine reads the host repository, scoped identity elevation, errors and
//! configuration.
//!
//! The engine never owns or mutates repository state. Everything it knows
//! about nodes, permissions, holds and dispositions comes through the traits
//! in [`traits`], bundled together as [`Services`].
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all file-plan components
//! - **id**: Strongly-typed identifiers
//! - **qname**: Dictionary names
//! - **model**: Types, aspects, properties and permission names
//! - **traits**: Collaborator interfaces and identity elevation
//! - **types**: Value types exchanged with collaborators
//! - **repository**: In-memory collaborator implementation
//! - **utils**: Configuration and log levels

pub mod error;
pub mod id;
pub mod model;
pub mod qname;
pub mod repository;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use id::{EvaluationId, NodeRef};
pub use qname::QName;
pub use services::Services;
pub use traits::{
    run_as, run_as_system, AuthenticationStack, DictionaryLookup, DispositionLookup,
    ElevationGuard, HoldLookup, IdentityContext, NodeLookup, PermissionLookup,
    RecordClassification,
};
pub use types::{
    AccessStatus, ChildAssociation, DispositionAction, DispositionActionDefinition,
    DispositionSchedule, FilePlanComponentKind, PropertyMap, PropertyValue,
};
pub use utils::{AfterInvocationConfig, AuditConfig, EngineConfig, LogLevel};
