//! Logging utilities.
//!
//! Evaluation logs through `tracing`. This module names the verbosity the
//! engine is configured with and maps it onto `tracing` levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Log level.
///
/// Ordered by increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every condition and permission lookup.
    Trace,

    /// Abstentions, denials and delegation.
    Debug,

    /// Registry population and configuration.
    Info,

    /// Recoverable problems.
    #[serde(alias = "warn")]
    Warning,

    /// Errors.
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    /// Get the name of this log level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// The matching `tracing` level.
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Check if this log level is at least as severe as the given level.
    ///
    /// # Arguments
    ///
    /// * `level` - The level to compare against.
    ///
    /// # Returns
    ///
    /// `true` if this log level is at least as severe as the given level,
    /// `false` otherwise.
    pub fn is_at_least(&self, level: LogLevel) -> bool {
        *self >= level
    }

    /// Whether an engine configured at this level emits events at `event`.
    pub fn enables(&self, event: LogLevel) -> bool {
        event.is_at_least(*self)
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    /// Parse a case-insensitive level name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" | "err" => Ok(Self::Error),
            _ => Err(ConfigError::Invalid(format!("unknown log level '{}'", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
