//! Security directives.
//!
//! A method is guarded by an ordered list of string directives. Only
//! directives starting with `RM` belong to the entry voter; anything else
//! (for example `ACL_NODE.0.sys:base.Read`) is left to other voters and
//! ignored here.
//!
//! The supported forms are:
//!
//! - `RM_ALLOW`, `RM_DENY`, `RM_ABSTAIN`, `RM_QUERY`
//! - `RM_CAP.<argument>.<permission group>.<capability>[.parent]`
//! - `RM.<policy>[.<argument>...]`
//!
//! Argument positions are zero based; a negative position refers to the
//! file plan root rather than to an invocation argument.

use std::fmt;
use std::str::FromStr;

use fileplan_core::error::PolicyError;
use fileplan_core::{QName, Result};
use serde::{Deserialize, Serialize};

use super::EntryPolicy;

const PREFIX: &str = "RM";
const ALLOW: &str = "RM_ALLOW";
const DENY: &str = "RM_DENY";
const ABSTAIN: &str = "RM_ABSTAIN";
const QUERY: &str = "RM_QUERY";
const CAPABILITY: &str = "RM_CAP";

/// A reference to the node or value a directive tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgumentRef {
    /// The root of the file plan.
    FilePlan,

    /// An invocation argument, by position.
    Index(usize),
}

impl ArgumentRef {
    /// Build from a raw position; negative positions mean the file plan.
    pub fn from_position(position: i64) -> Self {
        if position < 0 {
            Self::FilePlan
        } else {
            Self::Index(position as usize)
        }
    }

    /// The argument position, `None` for the file plan root.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::FilePlan => None,
            Self::Index(index) => Some(*index),
        }
    }

    /// Whether the reference points past the end of an argument list.
    pub fn is_out_of_range(&self, argument_count: usize) -> bool {
        matches!(self, Self::Index(index) if *index >= argument_count)
    }
}

impl fmt::Display for ArgumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilePlan => write!(f, "-1"),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A parsed security directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Grant unconditionally.
    Allow,

    /// Deny unconditionally.
    Deny,

    /// Abstain unconditionally.
    Abstain,

    /// Grant; the result is filtered after the call by `AFTER_RM`
    /// directives.
    Query,

    /// Require a capability on the node an argument refers to.
    Capability {
        /// The tested argument.
        argument: ArgumentRef,

        /// The permission group the capability belongs to.
        group: QName,

        /// The capability name.
        capability: String,

        /// Test the primary parent instead of the node itself.
        parent: bool,
    },

    /// Require an entry policy to grant.
    Policy {
        /// The policy to evaluate.
        policy: EntryPolicy,

        /// The arguments handed to the policy.
        arguments: Vec<ArgumentRef>,
    },
}

impl Directive {
    /// Whether the entry voter handles this directive.
    pub fn supports(directive: &str) -> bool {
        directive.starts_with(PREFIX)
    }

    /// Parse a supported directive.
    ///
    /// # Arguments
    ///
    /// * `directive` - The raw directive string.
    ///
    /// # Returns
    ///
    /// * `Ok(Directive)` - The parsed directive.
    /// * `Err` - `PolicyError::InvalidDirective` for malformed input,
    ///   `PolicyError::UnknownPolicy` for an `RM.` directive naming no policy.
    pub fn parse(directive: &str) -> Result<Self> {
        let tokens: Vec<&str> = directive.split('.').collect();
        match tokens[0] {
            ALLOW | DENY | ABSTAIN | QUERY if tokens.len() > 1 => {
                Err(invalid(directive, "takes no parameters"))
            }
            ALLOW => Ok(Self::Allow),
            DENY => Ok(Self::Deny),
            ABSTAIN => Ok(Self::Abstain),
            QUERY => Ok(Self::Query),
            CAPABILITY => Self::parse_capability(directive, &tokens[1..]),
            PREFIX => Self::parse_policy(directive, &tokens[1..]),
            _ => Err(invalid(directive, "unknown directive type")),
        }
    }

    /// Parse the directives the entry voter handles, in order, skipping the rest.
    pub fn parse_all<S: AsRef<str>>(directives: &[S]) -> Result<Vec<Self>> {
        directives
            .iter()
            .map(|directive| directive.as_ref())
            .filter(|directive| Self::supports(directive))
            .map(Self::parse)
            .collect()
    }

    /// The first two argument references, which must be in range for the
    /// directive to apply.
    pub fn leading_arguments(&self) -> Vec<ArgumentRef> {
        match self {
            Self::Capability { argument, .. } => vec![*argument],
            Self::Policy { arguments, .. } => arguments.iter().take(2).copied().collect(),
            _ => Vec::new(),
        }
    }

    fn parse_capability(directive: &str, tokens: &[&str]) -> Result<Self> {
        if tokens.len() < 3 {
            return Err(invalid(
                directive,
                "expected RM_CAP.<argument>.<group>.<capability>",
            ));
        }
        let argument = parse_position(directive, tokens[0])?;
        let group = QName::from_str(tokens[1])
            .map_err(|_| invalid(directive, "permission group is not a qualified name"))?;
        if tokens[2].is_empty() {
            return Err(invalid(directive, "capability name is empty"));
        }

        Ok(Self::Capability {
            argument,
            group,
            capability: tokens[2].to_string(),
            parent: tokens.len() > 3,
        })
    }

    fn parse_policy(directive: &str, tokens: &[&str]) -> Result<Self> {
        let name = match tokens.first() {
            Some(name) if !name.is_empty() => *name,
            _ => return Err(invalid(directive, "policy name is missing")),
        };
        let policy = EntryPolicy::from_str(name)?;
        let arguments = tokens[1..]
            .iter()
            .map(|token| parse_position(directive, token))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::Policy { policy, arguments })
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "{}", ALLOW),
            Self::Deny => write!(f, "{}", DENY),
            Self::Abstain => write!(f, "{}", ABSTAIN),
            Self::Query => write!(f, "{}", QUERY),
            Self::Capability {
                argument,
                group,
                capability,
                parent,
            } => {
                write!(f, "{}.{}.{}.{}", CAPABILITY, argument, group, capability)?;
                if *parent {
                    write!(f, ".parent")?;
                }
                Ok(())
            }
            Self::Policy { policy, arguments } => {
                write!(f, "{}.{}", PREFIX, policy)?;
                for argument in arguments {
                    write!(f, ".{}", argument)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Directive {
    type Err = fileplan_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_position(directive: &str, token: &str) -> Result<ArgumentRef> {
    token
        .parse::<i64>()
        .map(ArgumentRef::from_position)
        .map_err(|_| invalid(directive, &format!("'{}' is not an argument position", token)))
}

fn invalid(directive: &str, reason: &str) -> fileplan_core::Error {
    PolicyError::InvalidDirective {
        directive: directive.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileplan_core::Error;

    #[test]
    fn test_parse_fixed_directives() {
        assert_eq!(Directive::parse("RM_ALLOW").unwrap(), Directive::Allow);
        assert_eq!(Directive::parse("RM_DENY").unwrap(), Directive::Deny);
        assert_eq!(Directive::parse("RM_ABSTAIN").unwrap(), Directive::Abstain);
        assert_eq!(Directive::parse("RM_QUERY").unwrap(), Directive::Query);
    }

    #[test]
    fn test_parse_capability_directive() {
        let directive = Directive::parse("RM_CAP.0.rma:filePlanComponent.ViewRecords").unwrap();
        assert_eq!(
            directive,
            Directive::Capability {
                argument: ArgumentRef::Index(0),
                group: QName::from_static("rma", "filePlanComponent"),
                capability: "ViewRecords".to_string(),
                parent: false,
            }
        );

        let parent = Directive::parse("RM_CAP.1.rma:filePlanComponent.FileRecords.parent").unwrap();
        assert!(matches!(parent, Directive::Capability { parent: true, .. }));
        assert_eq!(
            parent.to_string(),
            "RM_CAP.1.rma:filePlanComponent.FileRecords.parent"
        );
    }

    #[test]
    fn test_parse_policy_directive() {
        let directive = Directive::parse("RM.Move.0.-1").unwrap();
        assert_eq!(
            directive,
            Directive::Policy {
                policy: EntryPolicy::Move,
                arguments: vec![ArgumentRef::Index(0), ArgumentRef::FilePlan],
            }
        );
        assert_eq!(directive.to_string(), "RM.Move.0.-1");
    }

    #[test]
    fn test_malformed_directives() {
        for raw in [
            "RM_CAP.0.rma:filePlanComponent",
            "RM_CAP.x.rma:filePlanComponent.ViewRecords",
            "RM_CAP.0.filePlanComponent.ViewRecords",
            "RM.Read.first",
            "RM",
            "RM_ALLOW.0",
            "RMX",
        ] {
            let err = Directive::parse(raw).unwrap_err();
            assert!(
                matches!(err, Error::Policy(PolicyError::InvalidDirective { .. })),
                "{} gave {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_unknown_policy() {
        let err = Directive::parse("RM.Teleport.0").unwrap_err();
        assert!(matches!(err, Error::Policy(PolicyError::UnknownPolicy(name)) if name == "Teleport"));
    }

    #[test]
    fn test_parse_all_skips_foreign_directives() {
        let parsed =
            Directive::parse_all(&["ACL_NODE.0.sys:base.Read", "RM_ALLOW", "ROLE_ADMIN"]).unwrap();
        assert_eq!(parsed, vec![Directive::Allow]);
    }

    #[test]
    fn test_argument_ranges() {
        let directive = Directive::parse("RM.Create.0.1.2").unwrap();
        assert_eq!(
            directive.leading_arguments(),
            vec![ArgumentRef::Index(0), ArgumentRef::Index(1)]
        );
        assert!(ArgumentRef::Index(2).is_out_of_range(2));
        assert!(!ArgumentRef::FilePlan.is_out_of_range(0));
    }
}
