//! Qualified names.
//!
//! Types, aspects, properties and association types in the repository
//! dictionary are all named by a `prefix:localName` pair. The model
//! vocabulary in [`crate::model`] is made of `const` qualified names, so
//! the representation borrows static strings where it can.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A namespace-prefixed dictionary name such as `rma:recordFolder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    prefix: Cow<'static, str>,
    local_name: Cow<'static, str>,
}

impl QName {
    /// Build a qualified name from static parts, usable in `const` items.
    pub const fn from_static(prefix: &'static str, local_name: &'static str) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            local_name: Cow::Borrowed(local_name),
        }
    }

    /// Build a qualified name from owned parts.
    pub fn new(prefix: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            prefix: Cow::Owned(prefix.into()),
            local_name: Cow::Owned(local_name.into()),
        }
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The local part of the name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local_name)
    }
}

impl FromStr for QName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                Ok(Self::new(prefix, local))
            }
            _ => Err(ConfigError::Invalid(format!(
                "qualified name '{}' must have the form prefix:localName",
                s
            ))),
        }
    }
}

impl Serialize for QName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_owned_names_compare_equal() {
        const FOLDER: QName = QName::from_static("rma", "recordFolder");
        let parsed: QName = "rma:recordFolder".parse().unwrap();
        assert_eq!(FOLDER, parsed);
        assert_eq!(parsed.prefix(), "rma");
        assert_eq!(parsed.local_name(), "recordFolder");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!("recordFolder".parse::<QName>().is_err());
        assert!(":recordFolder".parse::<QName>().is_err());
        assert!("rma:".parse::<QName>().is_err());
    }

    #[test]
    fn test_serde_uses_prefixed_string() {
        let name = QName::from_static("cm", "content");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"cm:content\"");
        let back: QName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
