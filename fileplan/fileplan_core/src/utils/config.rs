//! Engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ConfigError, Result};
use crate::utils::logging::LogLevel;

/// Audit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether evaluations are recorded
    #[serde(default)]
    pub enabled: bool,

    /// Entries kept per subject before the oldest are dropped
    #[serde(default = "default_max_entries_per_subject")]
    pub max_entries_per_subject: usize,
}

fn default_max_entries_per_subject() -> usize {
    1000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries_per_subject: default_max_entries_per_subject(),
        }
    }
}

/// Bounds on filtering returned collections
///
/// Unset bounds are unlimited. Entries left unchecked once a bound is hit
/// are dropped from the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AfterInvocationConfig {
    /// Read checks made per collection before cutting off
    #[serde(default)]
    pub max_permission_checks: Option<usize>,

    /// Milliseconds spent checking one collection before cutting off
    #[serde(default)]
    pub max_permission_check_time_ms: Option<u64>,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How deep capabilities may delegate to one another
    #[serde(default = "default_max_delegation_depth")]
    pub max_delegation_depth: usize,

    /// Name of the system principal
    #[serde(default = "default_system_user")]
    pub system_user: String,

    /// Evaluation log verbosity
    #[serde(default)]
    pub log_level: LogLevel,

    /// Capability catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Audit configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Result filtering bounds
    #[serde(default)]
    pub after_invocation: AfterInvocationConfig,
}

fn default_max_delegation_depth() -> usize {
    8
}

fn default_system_user() -> String {
    "System".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_delegation_depth: default_max_delegation_depth(),
            system_user: default_system_user(),
            log_level: LogLevel::default(),
            catalog_path: None,
            audit: AuditConfig::default(),
            after_invocation: AfterInvocationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading engine configuration from {}", path.display());

        if !path.exists() {
            warn!("Configuration file not found: {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadFailed(format!("{}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_delegation_depth == 0 {
            return Err(
                ConfigError::Invalid("max_delegation_depth cannot be zero".to_string()).into(),
            );
        }

        if self.system_user.trim().is_empty() {
            return Err(ConfigError::Invalid("system_user cannot be empty".to_string()).into());
        }

        if self.audit.max_entries_per_subject == 0 {
            return Err(ConfigError::Invalid(
                "audit.max_entries_per_subject cannot be zero".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_delegation_depth, 8);
        assert_eq!(config.system_user, "System");
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.max_entries_per_subject, 1000);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.after_invocation.max_permission_checks, None);
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            max_delegation_depth = 4
            log_level = "debug"

            [audit]
            enabled = true

            [after_invocation]
            max_permission_checks = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.max_delegation_depth, 4);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.audit.enabled);
        assert_eq!(config.audit.max_entries_per_subject, 1000);
        assert_eq!(config.after_invocation.max_permission_checks, Some(50));
        assert_eq!(config.after_invocation.max_permission_check_time_ms, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = EngineConfig::from_toml_str("max_delegation_depth = 0");
        assert!(matches!(result, Err(Error::Config(ConfigError::Invalid(_)))));

        let result = EngineConfig::from_toml_str("system_user = \" \"");
        assert!(matches!(result, Err(Error::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let result = EngineConfig::from_toml_str("max_delegation_depth = \"deep\"");
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseFailed(_)))));
    }
}
