//! Capability registry.
//!
//! Name-to-capability lookup. The registry is populated once, when the
//! catalog is installed, and only read during evaluation, so concurrent
//! and re-entrant lookups from delegating capabilities are safe.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use fileplan_core::error::{CapabilityError, ConditionError};
use fileplan_core::Result;

use crate::condition::ConditionRegistry;
use crate::model::Capability;

/// Named capabilities
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: DashMap<String, Arc<Capability>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            capabilities: DashMap::new(),
        }
    }

    /// Registers a capability under its name
    pub fn register(&self, capability: Capability) -> Result<()> {
        let name = capability.name().to_string();
        match self.capabilities.entry(name) {
            Entry::Occupied(entry) => Err(CapabilityError::AlreadyExists(entry.key().clone()).into()),
            Entry::Vacant(entry) => {
                debug!(capability = %entry.key(), kind = capability.type_name(), "Registered capability");
                entry.insert(Arc::new(capability));
                Ok(())
            }
        }
    }

    /// Looks up a capability by name
    pub fn get(&self, name: &str) -> Result<Arc<Capability>> {
        self.capabilities
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CapabilityError::NotFound(name.to_string()).into())
    }

    /// Whether a capability is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// All capabilities sorted by name, private ones only when asked for
    pub fn capabilities(&self, include_private: bool) -> Vec<Arc<Capability>> {
        let mut capabilities: Vec<Arc<Capability>> = self
            .capabilities
            .iter()
            .filter(|entry| include_private || !entry.value().is_private())
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        capabilities.sort_by(|a, b| a.name().cmp(b.name()));
        capabilities
    }

    /// Public capabilities in a display group, sorted by name
    pub fn group(&self, group: &str) -> Vec<Arc<Capability>> {
        self.capabilities(false)
            .into_iter()
            .filter(|capability| capability.meta().group.as_deref() == Some(group))
            .collect()
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether no capability is registered
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Checks that every delegate and condition name resolves
    ///
    /// Evaluation fails on unknown names anyway; validating after
    /// installation reports them before the first request.
    pub fn validate(&self, conditions: &ConditionRegistry) -> Result<()> {
        for capability in self.capabilities(true) {
            for delegate in capability.delegates() {
                if !self.contains(delegate) {
                    return Err(CapabilityError::NotFound(format!(
                        "{} (delegate of {})",
                        delegate,
                        capability.name()
                    ))
                    .into());
                }
            }
            for condition in capability.condition_names() {
                if !conditions.contains(condition) {
                    return Err(ConditionError::NotFound(format!(
                        "{} (required by {})",
                        condition,
                        capability.name()
                    ))
                    .into());
                }
            }
        }
        info!(
            capabilities = self.len(),
            conditions = conditions.len(),
            "Capability registry validated"
        );
        Ok(())
    }
}
