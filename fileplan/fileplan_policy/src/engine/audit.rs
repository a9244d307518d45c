//! Vote auditing.
//!
//! This module keeps a bounded history of entry votes per principal.

use dashmap::DashMap;
use fileplan_capability::AccessDecision;
use fileplan_core::Result;
use std::sync::Arc;

use crate::model::Vote;

/// A vote audit.
///
/// Votes are grouped by principal; once a principal has more than the
/// configured number of votes, the oldest are dropped.
#[derive(Clone)]
pub struct VoteAudit {
    /// The votes, per principal.
    entries: Arc<DashMap<String, Vec<Vote>>>,

    /// The maximum number of votes to keep per principal.
    max_entries_per_subject: usize,
}

impl VoteAudit {
    /// Create a new vote audit.
    ///
    /// # Arguments
    ///
    /// * `max_entries_per_subject` - The maximum number of votes to keep per principal.
    pub fn new(max_entries_per_subject: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries_per_subject,
        }
    }

    /// Record a vote.
    pub fn record(&self, vote: Vote) {
        let mut votes = self.entries.entry(vote.principal.clone()).or_default();
        votes.push(vote);
        if votes.len() > self.max_entries_per_subject {
            let excess = votes.len() - self.max_entries_per_subject;
            votes.drain(0..excess);
        }
    }

    /// Votes made for a principal, oldest first.
    pub fn get_votes(&self, principal: &str) -> Vec<Vote> {
        self.entries
            .get(principal)
            .map(|votes| votes.clone())
            .unwrap_or_default()
    }

    /// Forget the votes made for a principal.
    pub fn clear_votes(&self, principal: &str) {
        self.entries.remove(principal);
    }

    /// Every recorded vote.
    pub fn get_all_votes(&self) -> Vec<Vote> {
        self.entries
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }

    /// Every recorded vote with the given decision.
    ///
    /// # Arguments
    ///
    /// * `decision` - The decision to filter by.
    pub fn get_votes_by_decision(&self, decision: AccessDecision) -> Vec<Vote> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|vote| vote.decision == decision)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The votes made for a principal as a JSON array, oldest first.
    pub fn export_json(&self, principal: &str) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.get_votes(principal))?)
    }

    /// Forget every vote.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
