//! Vote results.

use chrono::{DateTime, Utc};
use fileplan_capability::AccessDecision;
use serde::{Deserialize, Serialize};

/// The outcome of voting on one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    /// The principal the vote was made for.
    pub principal: String,

    /// The guarded method.
    pub method: String,

    /// The decision.
    pub decision: AccessDecision,

    /// The directive that settled the vote, `None` when no directive applied
    /// or every directive passed.
    pub decided_by: Option<String>,

    /// When the vote was made.
    pub timestamp: DateTime<Utc>,
}

impl Vote {
    /// Create a new vote.
    ///
    /// # Arguments
    ///
    /// * `principal` - The principal the vote was made for.
    /// * `method` - The guarded method.
    /// * `decision` - The decision.
    /// * `decided_by` - The directive that settled the vote.
    pub fn new(
        principal: impl Into<String>,
        method: impl Into<String>,
        decision: AccessDecision,
        decided_by: Option<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            method: method.into(),
            decision,
            decided_by,
            timestamp: Utc::now(),
        }
    }

    /// Whether the vote grants the call.
    pub fn is_granted(&self) -> bool {
        self.decision.is_granted()
    }
}
