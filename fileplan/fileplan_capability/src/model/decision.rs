//! Access decisions.

use fileplan_core::AccessStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome of evaluating a capability against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessDecision {
    /// The capability applies and grants.
    Granted,

    /// The capability applies and refuses.
    Denied,

    /// The capability has no opinion about this kind of node.
    Abstain,

    /// The decision depends on information not supplied, e.g. a move
    /// destination.
    Undetermined,
}

impl AccessDecision {
    /// Whether this decision grants access.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Translate into the three-valued status exposed to callers.
    pub fn to_access_status(&self) -> AccessStatus {
        match self {
            Self::Granted => AccessStatus::Allowed,
            Self::Denied => AccessStatus::Denied,
            Self::Abstain | Self::Undetermined => AccessStatus::Undetermined,
        }
    }

    /// Combine lazily produced member decisions.
    ///
    /// The first `Granted` wins and stops the iteration. Otherwise the first
    /// decision that is not `Abstain` is returned, and `Abstain` when every
    /// member abstained or there were none. Errors stop the iteration.
    pub fn first_granted<I, E>(decisions: I) -> Result<AccessDecision, E>
    where
        I: IntoIterator<Item = Result<AccessDecision, E>>,
    {
        let mut first_opinion = None;
        for decision in decisions {
            match decision? {
                Self::Granted => return Ok(Self::Granted),
                Self::Abstain => {}
                other => {
                    first_opinion.get_or_insert(other);
                }
            }
        }
        Ok(first_opinion.unwrap_or(Self::Abstain))
    }
}

impl From<AccessDecision> for AccessStatus {
    fn from(decision: AccessDecision) -> Self {
        decision.to_access_status()
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "GRANTED"),
            Self::Denied => write!(f, "DENIED"),
            Self::Abstain => write!(f, "ABSTAIN"),
            Self::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Outcome = Result<AccessDecision, ()>;

    #[test]
    fn test_access_status_translation() {
        assert_eq!(AccessDecision::Granted.to_access_status(), AccessStatus::Allowed);
        assert_eq!(AccessDecision::Denied.to_access_status(), AccessStatus::Denied);
        assert_eq!(
            AccessDecision::Abstain.to_access_status(),
            AccessStatus::Undetermined
        );
        assert_eq!(
            AccessStatus::from(AccessDecision::Undetermined),
            AccessStatus::Undetermined
        );
    }

    #[test]
    fn test_first_granted_wins_over_earlier_denial() {
        let decisions: Vec<Outcome> = vec![
            Ok(AccessDecision::Denied),
            Ok(AccessDecision::Abstain),
            Ok(AccessDecision::Granted),
        ];
        assert_eq!(
            AccessDecision::first_granted(decisions),
            Ok(AccessDecision::Granted)
        );
    }

    #[test]
    fn test_first_opinion_kept_when_nothing_grants() {
        let decisions: Vec<Outcome> = vec![
            Ok(AccessDecision::Abstain),
            Ok(AccessDecision::Undetermined),
            Ok(AccessDecision::Denied),
        ];
        assert_eq!(
            AccessDecision::first_granted(decisions),
            Ok(AccessDecision::Undetermined)
        );

        let all_abstain: Vec<Outcome> = vec![Ok(AccessDecision::Abstain); 3];
        assert_eq!(
            AccessDecision::first_granted(all_abstain),
            Ok(AccessDecision::Abstain)
        );
        assert_eq!(
            AccessDecision::first_granted(Vec::<Outcome>::new()),
            Ok(AccessDecision::Abstain)
        );
    }

    #[test]
    fn test_first_granted_stops_early() {
        let mut evaluated = 0;
        let decisions = [AccessDecision::Granted, AccessDecision::Denied]
            .into_iter()
            .map(|d| {
                evaluated += 1;
                Outcome::Ok(d)
            });
        assert_eq!(
            AccessDecision::first_granted(decisions),
            Ok(AccessDecision::Granted)
        );
        assert_eq!(evaluated, 1);
    }
}
