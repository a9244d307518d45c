use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use fileplan_core::error::ConditionError;
use fileplan_core::{NodeRef, Result, Services};

use super::Condition;

/// Named conditions
///
/// Populated when the catalog is installed and only read afterwards.
/// Lookups of unknown names fail with [`ConditionError::NotFound`].
#[derive(Default)]
pub struct ConditionRegistry {
    conditions: DashMap<String, Arc<Condition>>,
}

impl ConditionRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            conditions: DashMap::new(),
        }
    }

    /// Registers a condition under `name`
    pub fn register(&self, name: impl Into<String>, condition: Condition) -> Result<()> {
        match self.conditions.entry(name.into()) {
            Entry::Occupied(entry) => Err(ConditionError::AlreadyExists(entry.key().clone()).into()),
            Entry::Vacant(entry) => {
                debug!(condition = %entry.key(), kind = condition.type_name(), "Registered condition");
                entry.insert(Arc::new(condition));
                Ok(())
            }
        }
    }

    /// Looks up a condition by name
    pub fn get(&self, name: &str) -> Result<Arc<Condition>> {
        self.conditions
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ConditionError::NotFound(name.to_string()).into())
    }

    /// Whether a condition is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    /// Evaluates the named condition against a node
    pub fn evaluate(&self, name: &str, services: &Services, node: &NodeRef) -> Result<bool> {
        self.get(name)?.evaluate(services, node)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.conditions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of registered conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether no condition is registered
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileplan_core::Error;

    #[test]
    fn test_register_and_get() {
        let registry = ConditionRegistry::new();
        registry.register("closed", Condition::Closed).unwrap();
        registry
            .register("frozen", Condition::Frozen { check_children: false })
            .unwrap();

        assert_eq!(*registry.get("closed").unwrap(), Condition::Closed);
        assert!(registry.contains("frozen"));
        assert_eq!(registry.names(), vec!["closed", "frozen"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = ConditionRegistry::new();
        registry.register("closed", Condition::Closed).unwrap();
        let result = registry.register("closed", Condition::Declared);
        assert!(matches!(
            result,
            Err(Error::Condition(ConditionError::AlreadyExists(name))) if name == "closed"
        ));
        assert_eq!(*registry.get("closed").unwrap(), Condition::Closed);
    }

    #[test]
    fn test_unknown_name_fails_fast() {
        let registry = ConditionRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(Error::Condition(ConditionError::NotFound(name))) if name == "missing"
        ));
    }
}
