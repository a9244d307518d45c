//! Error types for the file-plan engine.
//!
//! The root error type, `Error`, wraps one error enum per subsystem so that
//! callers can match on the failing area while still using a single
//! `Result` alias throughout.
//!
//! Evaluation outcomes are never errors: a capability that does not apply
//! abstains, one that applies and refuses denies. Errors are reserved for
//! misconfiguration (an unknown capability or condition name) and for
//! failures reported by the repository collaborators, which are passed
//! through unchanged.

use crate::id::NodeRef;
use thiserror::Error;

/// Root error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Capability configuration or evaluation errors
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Condition configuration errors
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),

    /// Errors raised by the repository collaborators
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Entry voter errors
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors related to capabilities.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// No capability is registered under the given name
    #[error("Capability not found: {0}")]
    NotFound(String),

    /// A capability or role with the given name is already registered
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A capability definition is malformed
    #[error("Invalid capability definition: {0}")]
    Invalid(String),

    /// No role is registered under the given name
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// A specialised entry point was used on a capability of another variant
    #[error("Capability type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected capability variant
        expected: String,

        /// Actual capability variant
        actual: String,
    },

    /// Delegation between capabilities went deeper than configured
    #[error("Delegation depth {depth} exceeded while evaluating '{capability}'")]
    DelegationDepthExceeded {
        /// The capability that would have been entered
        capability: String,

        /// The configured maximum depth
        depth: usize,
    },
}

/// Errors related to capability conditions.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// No condition is registered under the given name
    #[error("Condition not found: {0}")]
    NotFound(String),

    /// A condition with the given name is already registered
    #[error("Condition already registered: {0}")]
    AlreadyExists(String),
}

/// Errors reported by the repository collaborators.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(NodeRef),

    /// The node is not part of any file plan
    #[error("Node {0} is not in a file plan")]
    NoFilePlan(NodeRef),

    /// A backing service could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The identity stack was popped more often than pushed
    #[error("Identity stack underflow")]
    IdentityUnderflow,
}

/// Errors related to the entry voter.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A security directive could not be parsed
    #[error("Invalid directive '{directive}': {reason}")]
    InvalidDirective {
        /// The raw directive
        directive: String,

        /// Why it was rejected
        reason: String,
    },

    /// A directive names an entry policy that does not exist
    #[error("Unknown entry policy: {0}")]
    UnknownPolicy(String),

    /// An invocation argument has the wrong shape for the policy
    #[error("Argument {index} is not {expected}")]
    ArgumentMismatch {
        /// Argument position
        index: usize,

        /// What the policy needed
        expected: String,
    },

    /// A returned value the principal may not read
    #[error("Access denied to {0}")]
    AccessDenied(String),

    /// A returned value the result filter cannot inspect
    #[error("Cannot filter returned {0}")]
    UnsupportedReturn(String),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration could not be read
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    /// The configuration could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration is well-formed but not acceptable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type used throughout the file-plan engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let error: Error = CapabilityError::NotFound("Create".to_string()).into();
        assert!(matches!(error, Error::Capability(CapabilityError::NotFound(_))));

        let error: Error = ConditionError::NotFound("closed".to_string()).into();
        assert!(matches!(error, Error::Condition(_)));

        let node = NodeRef::new();
        let error: Error = RepositoryError::NodeNotFound(node).into();
        assert!(matches!(error, Error::Repository(RepositoryError::NodeNotFound(n)) if n == node));
    }

    #[test]
    fn test_error_display() {
        let error: Error = CapabilityError::NotFound("Create".to_string()).into();
        assert_eq!(
            error.to_string(),
            "Capability error: Capability not found: Create"
        );

        let error: Error = CapabilityError::DelegationDepthExceeded {
            capability: "Create".to_string(),
            depth: 8,
        }
        .into();
        assert!(error.to_string().contains("depth 8"));
    }
}
