//! Capability catalog.
//!
//! The catalog is the TOML description of every condition, capability and
//! role the engine knows about. A catalog is parsed, converted into typed
//! conditions and capabilities, installed into the registries and then
//! validated, so that a delegate or condition name that does not resolve
//! is reported at start-up.
//!
//! ```toml
//! [[condition]]
//! name = "frozen"
//! type = "frozen"
//!
//! [[capability]]
//! name = "DeleteRecords"
//! kinds = ["record"]
//! conditions = { frozen = false }
//! permissions = ["DeleteRecords"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fileplan_core::error::{CapabilityError, ConfigError};
use fileplan_core::{FilePlanComponentKind, QName, Result};

use crate::condition::{Condition, ConditionRegistry};
use crate::model::{
    Capability, CapabilityMeta, CompositeCapability, CreateCapability, DeclarativeCapability,
    EditCapability, EscalationStage, Fallback, FileRecordsCapability, MoveRecordsCapability,
    ReferencesCapability, Requirements,
};
use crate::registry::CapabilityRegistry;

/// The catalog installed when no catalog file is configured
pub const DEFAULT_CATALOG: &str = include_str!("default_catalog.toml");

/// A named condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Name capabilities refer to the condition by
    pub name: String,

    /// The condition, tagged by `type`
    #[serde(flatten)]
    pub condition: Condition,
}

/// Capability variant tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    #[default]
    Declarative,
    Composite,
    Create,
    MoveRecords,
    Edit,
    References,
    FileRecords,
}

/// A capability as written in a catalog
///
/// One flat table serves every variant; each variant reads the fields it
/// understands and rejects a definition that misses a field it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityDefinition {
    /// Unique name
    pub name: String,

    /// Variant tag
    #[serde(rename = "type")]
    pub capability_type: CapabilityType,

    /// Excluded from public listings
    pub private: bool,

    /// Display title
    pub title: Option<String>,

    /// Display group
    pub group: Option<String>,

    /// Kinds the capability applies to
    pub kinds: Option<BTreeSet<FilePlanComponentKind>>,

    /// Condition name to required value
    pub conditions: BTreeMap<String, bool>,

    /// Permissions that must all be allowed
    pub permissions: Vec<String>,

    /// Members of a composite, in evaluation order
    pub members: Vec<String>,

    /// Escalation stages of create and file-records capabilities
    pub stages: Vec<EscalationStage>,

    /// Create fallbacks, in evaluation order
    pub fallbacks: Vec<Fallback>,

    /// Create: capability tried last against destination and linkee
    pub references: Option<String>,

    /// Create: permission required on the linkee
    pub linkee_permission: Option<String>,

    /// Create: permission granting a record link
    pub link_permission: Option<String>,

    /// File records: content type that is fileable
    pub fileable_type: Option<QName>,

    /// File records: permission required to file fileable content
    pub fileable_permission: Option<String>,

    /// Move: permission required to read the movee
    pub read_permission: Option<String>,

    /// Move: capability deleting a file-plan component movee
    pub delete_capability: Option<String>,

    /// Move: permission deleting any other movee
    pub delete_permission: Option<String>,

    /// Move: create capability evaluated on the destination
    pub create_capability: Option<String>,

    /// Move: permission required for a file-plan component movee
    pub move_permission: Option<String>,
}

impl CapabilityDefinition {
    fn required(&self, field: Option<&String>, field_name: &str) -> Result<String> {
        field.cloned().ok_or_else(|| {
            CapabilityError::Invalid(format!(
                "{} capability '{}' requires '{}'",
                self.capability_type.as_str(),
                self.name,
                field_name
            ))
            .into()
        })
    }

    fn has_requirements(&self) -> bool {
        self.kinds.is_some() || !self.conditions.is_empty() || !self.permissions.is_empty()
    }

    /// Converts the definition into a capability
    pub fn into_capability(self) -> Result<Capability> {
        if self.name.trim().is_empty() {
            return Err(CapabilityError::Invalid("capability without a name".to_string()).into());
        }

        let mut meta = CapabilityMeta::new(self.name.clone());
        if self.private {
            meta = meta.private();
        }
        if let Some(title) = &self.title {
            meta = meta.title(title.clone());
        }
        if let Some(group) = &self.group {
            meta = meta.group(group.clone());
        }
        let requirements = Requirements {
            kinds: self.kinds.clone(),
            conditions: self.conditions.clone(),
            permissions: self.permissions.clone(),
        };

        let capability = match self.capability_type {
            CapabilityType::Declarative => {
                Capability::Declarative(DeclarativeCapability::new(meta, requirements))
            }
            CapabilityType::Composite => {
                if self.members.is_empty() {
                    return Err(CapabilityError::Invalid(format!(
                        "composite capability '{}' has no members",
                        self.name
                    ))
                    .into());
                }
                if self.has_requirements() {
                    return Err(CapabilityError::Invalid(format!(
                        "composite capability '{}' cannot declare requirements",
                        self.name
                    ))
                    .into());
                }
                Capability::Composite(CompositeCapability::new(meta, self.members))
            }
            CapabilityType::Create => Capability::Create(CreateCapability {
                linkee_permission: self
                    .required(self.linkee_permission.as_ref(), "linkee_permission")?,
                link_permission: self.required(self.link_permission.as_ref(), "link_permission")?,
                meta,
                stages: self.stages,
                fallbacks: self.fallbacks,
                references: self.references,
            }),
            CapabilityType::MoveRecords => Capability::MoveRecords(MoveRecordsCapability {
                read_permission: self.required(self.read_permission.as_ref(), "read_permission")?,
                delete_capability: self
                    .required(self.delete_capability.as_ref(), "delete_capability")?,
                delete_permission: self
                    .required(self.delete_permission.as_ref(), "delete_permission")?,
                create_capability: self
                    .required(self.create_capability.as_ref(), "create_capability")?,
                move_permission: self.required(self.move_permission.as_ref(), "move_permission")?,
                meta,
                kinds: self.kinds,
            }),
            CapabilityType::Edit => Capability::Edit(EditCapability::new(meta, requirements)),
            CapabilityType::References => {
                Capability::References(ReferencesCapability::new(meta, requirements))
            }
            CapabilityType::FileRecords => {
                let fileable_type = self.fileable_type.clone().ok_or_else(|| {
                    CapabilityError::Invalid(format!(
                        "file_records capability '{}' requires 'fileable_type'",
                        self.name
                    ))
                })?;
                Capability::FileRecords(FileRecordsCapability {
                    fileable_permission: self
                        .required(self.fileable_permission.as_ref(), "fileable_permission")?,
                    meta,
                    requirements,
                    fileable_type,
                    stages: self.stages,
                })
            }
        };
        Ok(capability)
    }
}

impl CapabilityType {
    /// The tag as written in catalogs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declarative => "declarative",
            Self::Composite => "composite",
            Self::Create => "create",
            Self::MoveRecords => "move_records",
            Self::Edit => "edit",
            Self::References => "references",
            Self::FileRecords => "file_records",
        }
    }
}

/// A role as written in a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Unique name
    pub name: String,

    /// Display label, the name when absent
    #[serde(default)]
    pub display_label: Option<String>,

    /// Capabilities granted by the role
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

/// Conditions, capabilities and roles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Named conditions
    #[serde(default)]
    pub condition: Vec<ConditionDefinition>,

    /// Capability definitions
    #[serde(default)]
    pub capability: Vec<CapabilityDefinition>,

    /// Role definitions
    #[serde(default)]
    pub role: Vec<RoleDefinition>,
}

impl Catalog {
    /// Parses a catalog from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadFailed(format!("{}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded capability catalog");
        Ok(catalog)
    }

    /// The embedded default catalog
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CATALOG)
    }

    /// Registers every condition and capability, then validates the
    /// capability registry against the condition registry
    pub fn install(
        &self,
        conditions: &ConditionRegistry,
        capabilities: &CapabilityRegistry,
    ) -> Result<()> {
        for definition in &self.condition {
            conditions.register(definition.name.clone(), definition.condition.clone())?;
        }
        for definition in &self.capability {
            capabilities.register(definition.clone().into_capability()?)?;
        }
        debug!(
            conditions = self.condition.len(),
            capabilities = self.capability.len(),
            "Installed capability catalog"
        );
        capabilities.validate(conditions)
    }

    /// Builds fresh registries from the catalog
    pub fn build(&self) -> Result<(ConditionRegistry, CapabilityRegistry)> {
        let conditions = ConditionRegistry::new();
        let capabilities = CapabilityRegistry::new();
        self.install(&conditions, &capabilities)?;
        Ok((conditions, capabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileplan_core::Error;

    #[test]
    fn test_builtin_catalog_installs() {
        let catalog = Catalog::builtin().unwrap();
        let (conditions, capabilities) = catalog.build().unwrap();

        assert!(conditions.contains("closed"));
        assert!(conditions.contains("frozen"));
        assert_eq!(capabilities.len(), catalog.capability.len());
        assert!(matches!(
            capabilities.get("Create").unwrap().as_ref(),
            Capability::Create(_)
        ));
        assert!(matches!(
            capabilities.get("MoveRecords").unwrap().as_ref(),
            Capability::MoveRecords(_)
        ));
        assert!(capabilities.get("Delete").unwrap().is_private());
        assert!(!catalog.role.is_empty());
    }

    #[test]
    fn test_condition_definition_is_tagged() {
        let catalog = Catalog::from_toml_str(
            r#"
            [[condition]]
            name = "remove_from_hold"
            type = "hold"
            included = true

            [[condition]]
            name = "cutoff"
            type = "has_aspect"
            aspect = "rma:cutOff"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.condition[0].condition, Condition::Hold { included: true });
        assert_eq!(
            catalog.condition[1].condition,
            Condition::HasAspect {
                aspect: QName::new("rma", "cutOff")
            }
        );
    }

    #[test]
    fn test_missing_variant_field_is_invalid() {
        let catalog = Catalog::from_toml_str(
            r#"
            [[capability]]
            name = "Create"
            type = "create"
            link_permission = "FileRecords"
            "#,
        )
        .unwrap();

        let result = catalog.build();
        assert!(matches!(
            result,
            Err(Error::Capability(CapabilityError::Invalid(msg))) if msg.contains("linkee_permission")
        ));
    }

    #[test]
    fn test_empty_composite_is_invalid() {
        let catalog = Catalog::from_toml_str(
            r#"
            [[capability]]
            name = "Update"
            type = "composite"
            "#,
        )
        .unwrap();

        assert!(matches!(
            catalog.build(),
            Err(Error::Capability(CapabilityError::Invalid(_)))
        ));
    }

    #[test]
    fn test_unresolved_names_fail_installation() {
        let catalog = Catalog::from_toml_str(
            r#"
            [[capability]]
            name = "Update"
            type = "composite"
            members = ["EditRecordMetadata"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            catalog.build(),
            Err(Error::Capability(CapabilityError::NotFound(_)))
        ));

        let catalog = Catalog::from_toml_str(
            r#"
            [[capability]]
            name = "ViewRecords"
            conditions = { closed = false }
            "#,
        )
        .unwrap();
        assert!(matches!(catalog.build(), Err(Error::Condition(_))));
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let result = Catalog::from_toml_str(
            r#"
            [[capability]]
            name = "Broken"
            type = "scripted"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseFailed(_)))));
    }
}
