//! Utility types.
//!
//! Engine configuration and log-level helpers.

pub mod config;
pub mod logging;

pub use config::{AfterInvocationConfig, AuditConfig, EngineConfig};
pub use logging::LogLevel;
