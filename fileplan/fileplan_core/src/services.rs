//! The collaborator bundle handed to the capability engine.

use std::sync::Arc;

use crate::traits::{
    DictionaryLookup, DispositionLookup, HoldLookup, IdentityContext, NodeLookup,
    PermissionLookup, RecordClassification,
};

/// Everything the engine reads from the host system.
///
/// Each collaborator is a separate trait object so hosts can back them
/// with different services.
#[derive(Clone)]
pub struct Services {
    /// Node structure and metadata
    pub nodes: Arc<dyn NodeLookup>,

    /// Type hierarchy
    pub dictionary: Arc<dyn DictionaryLookup>,

    /// Permissions of the current principal
    pub permissions: Arc<dyn PermissionLookup>,

    /// Disposition schedules and actions
    pub dispositions: Arc<dyn DispositionLookup>,

    /// Legal holds
    pub holds: Arc<dyn HoldLookup>,

    /// Records-management classification
    pub records: Arc<dyn RecordClassification>,

    /// Current principal and scoped elevation
    pub identity: Arc<dyn IdentityContext>,
}

impl Services {
    /// Bundle a single repository that implements every lookup.
    pub fn from_repository<R>(repository: Arc<R>, identity: Arc<dyn IdentityContext>) -> Self
    where
        R: NodeLookup
            + DictionaryLookup
            + PermissionLookup
            + DispositionLookup
            + HoldLookup
            + RecordClassification
            + 'static,
    {
        Self {
            nodes: repository.clone(),
            dictionary: repository.clone(),
            permissions: repository.clone(),
            dispositions: repository.clone(),
            holds: repository.clone(),
            records: repository,
            identity,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("current_user", &self.identity.current_user())
            .finish_non_exhaustive()
    }
}
