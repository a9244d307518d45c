//! Data types shared between the engine and its collaborators.

pub mod access;
pub mod disposition;
pub mod node;

pub use access::AccessStatus;
pub use disposition::{DispositionAction, DispositionActionDefinition, DispositionSchedule};
pub use node::{ChildAssociation, FilePlanComponentKind, PropertyMap, PropertyValue};
