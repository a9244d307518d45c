//! Roles.
//!
//! A role bundles capabilities under a display label and is assigned to
//! authorities (users or groups). Roles only name capabilities; whether a
//! capability is granted on a node is still decided by evaluating it.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fileplan_core::error::CapabilityError;
use fileplan_core::Result;

use crate::catalog::Catalog;
use crate::registry::CapabilityRegistry;

/// Name of the role that administers the file plan
pub const ADMINISTRATOR: &str = "Administrator";

/// A named set of capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique name
    pub name: String,

    /// Display label
    pub display_label: String,

    /// Capability names
    pub capabilities: BTreeSet<String>,

    /// When the role was last created or updated
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Whether the role includes `capability`
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Roles and their assigned authorities.
pub struct RoleRegistry {
    /// Capabilities a role may refer to
    capabilities: Arc<CapabilityRegistry>,

    /// Roles, indexed by name
    roles: DashMap<String, Role>,

    /// Authorities, indexed by role name
    authorities: DashMap<String, BTreeSet<String>>,
}

impl RoleRegistry {
    /// Create an empty registry over a capability registry.
    pub fn new(capabilities: Arc<CapabilityRegistry>) -> Self {
        Self {
            capabilities,
            roles: DashMap::new(),
            authorities: DashMap::new(),
        }
    }

    /// Create a registry holding the roles defined in `catalog`.
    pub fn from_catalog(catalog: &Catalog, capabilities: Arc<CapabilityRegistry>) -> Result<Self> {
        let registry = Self::new(capabilities);
        for definition in &catalog.role {
            let label = definition
                .display_label
                .clone()
                .unwrap_or_else(|| definition.name.clone());
            registry.create_role(
                &definition.name,
                &label,
                definition.capabilities.iter().cloned(),
            )?;
        }
        info!(roles = registry.roles.len(), "Installed roles");
        Ok(registry)
    }

    fn resolve(&self, capabilities: impl IntoIterator<Item = String>) -> Result<BTreeSet<String>> {
        let capabilities: BTreeSet<String> = capabilities.into_iter().collect();
        for capability in &capabilities {
            if !self.capabilities.contains(capability) {
                return Err(CapabilityError::NotFound(capability.clone()).into());
            }
        }
        Ok(capabilities)
    }

    /// Create a role.
    ///
    /// # Arguments
    ///
    /// * `name` - The unique role name.
    /// * `display_label` - The label shown to users.
    /// * `capabilities` - The capability names; each must be registered.
    ///
    /// # Returns
    ///
    /// The created role.
    pub fn create_role(
        &self,
        name: &str,
        display_label: &str,
        capabilities: impl IntoIterator<Item = String>,
    ) -> Result<Role> {
        let entry = match self.roles.entry(name.to_string()) {
            Entry::Occupied(_) => {
                return Err(CapabilityError::AlreadyExists(name.to_string()).into())
            }
            Entry::Vacant(entry) => entry,
        };
        let role = Role {
            name: name.to_string(),
            display_label: display_label.to_string(),
            capabilities: self.resolve(capabilities)?,
            updated_at: Utc::now(),
        };
        debug!(role = name, capabilities = role.capabilities.len(), "Created role");
        entry.insert(role.clone());
        Ok(role)
    }

    /// Replace the label and capabilities of an existing role.
    pub fn update_role(
        &self,
        name: &str,
        display_label: &str,
        capabilities: impl IntoIterator<Item = String>,
    ) -> Result<Role> {
        if !self.roles.contains_key(name) {
            return Err(CapabilityError::RoleNotFound(name.to_string()).into());
        }
        let capabilities = self.resolve(capabilities)?;
        let mut role = self
            .roles
            .get_mut(name)
            .ok_or_else(|| CapabilityError::RoleNotFound(name.to_string()))?;
        role.display_label = display_label.to_string();
        role.capabilities = capabilities;
        role.updated_at = Utc::now();
        debug!(role = name, "Updated role");
        Ok(role.clone())
    }

    /// Delete a role and its assignments.
    pub fn delete_role(&self, name: &str) -> Result<()> {
        if self.roles.remove(name).is_none() {
            return Err(CapabilityError::RoleNotFound(name.to_string()).into());
        }
        self.authorities.remove(name);
        debug!(role = name, "Deleted role");
        Ok(())
    }

    /// Look up a role by name.
    pub fn get_role(&self, name: &str) -> Result<Role> {
        self.roles
            .get(name)
            .map(|role| role.value().clone())
            .ok_or_else(|| CapabilityError::RoleNotFound(name.to_string()).into())
    }

    /// Whether a role with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// All roles, sorted by name.
    pub fn list_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.roles.iter().map(|r| r.value().clone()).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    /// Assign a role to an authority.
    pub fn assign_role(&self, authority: &str, role: &str) -> Result<()> {
        if !self.roles.contains_key(role) {
            return Err(CapabilityError::RoleNotFound(role.to_string()).into());
        }
        self.authorities
            .entry(role.to_string())
            .or_default()
            .insert(authority.to_string());
        debug!(role, authority, "Assigned role");
        Ok(())
    }

    /// Remove a role from an authority.
    ///
    /// Unassigning a role the authority does not hold is not an error.
    pub fn unassign_role(&self, authority: &str, role: &str) -> Result<()> {
        if !self.roles.contains_key(role) {
            return Err(CapabilityError::RoleNotFound(role.to_string()).into());
        }
        if let Some(mut assigned) = self.authorities.get_mut(role) {
            assigned.remove(authority);
        }
        debug!(role, authority, "Unassigned role");
        Ok(())
    }

    /// Roles assigned to an authority, sorted by name.
    pub fn roles_for_authority(&self, authority: &str) -> Vec<Role> {
        self.list_roles()
            .into_iter()
            .filter(|role| {
                self.authorities
                    .get(&role.name)
                    .map_or(false, |assigned| assigned.contains(authority))
            })
            .collect()
    }

    /// Authorities a role is assigned to.
    pub fn authorities_for_role(&self, role: &str) -> Result<BTreeSet<String>> {
        if !self.roles.contains_key(role) {
            return Err(CapabilityError::RoleNotFound(role.to_string()).into());
        }
        Ok(self
            .authorities
            .get(role)
            .map(|assigned| assigned.value().clone())
            .unwrap_or_default())
    }

    /// Whether the authority holds the administrator role.
    pub fn is_admin(&self, authority: &str) -> bool {
        self.authorities
            .get(ADMINISTRATOR)
            .map_or(false, |assigned| assigned.contains(authority))
    }

    /// Whether any role of the authority includes `capability`.
    pub fn has_capability(&self, authority: &str, capability: &str) -> bool {
        self.roles_for_authority(authority)
            .iter()
            .any(|role| role.has_capability(capability))
    }
}
