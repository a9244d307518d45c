//! Update payloads.

use std::collections::BTreeSet;

use fileplan_core::{PropertyMap, PropertyValue, QName};

/// The aspects and properties an update would change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    /// Aspects added or removed.
    pub aspects: BTreeSet<QName>,

    /// Properties set.
    pub properties: PropertyMap,
}

impl UpdatePayload {
    /// An empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an aspect change.
    pub fn aspect(mut self, aspect: QName) -> Self {
        self.aspects.insert(aspect);
        self
    }

    /// Add a property change.
    pub fn property(mut self, property: QName, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property, value.into());
        self
    }

    /// Whether the payload changes nothing.
    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty() && self.properties.is_empty()
    }
}
