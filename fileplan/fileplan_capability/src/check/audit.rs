use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use fileplan_core::{EvaluationId, NodeRef};

use crate::model::AccessDecision;

/// An entry in the audit log
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Identifier of the evaluation
    pub id: EvaluationId,

    /// When the evaluation finished
    pub timestamp: DateTime<Utc>,

    /// The principal the evaluation was made for
    pub principal: String,

    /// The evaluated capability
    pub capability: String,

    /// The evaluated node
    pub node: NodeRef,

    /// The target node of a pair evaluation
    pub target: Option<NodeRef>,

    /// The outcome
    pub decision: AccessDecision,
}

/// A thread-safe audit log of top-level capability evaluations
///
/// Entries are kept per principal; the oldest are dropped once a principal
/// has more than the configured maximum.
pub struct AuditLog {
    /// Map from principal to its entries, oldest first
    entries: RwLock<HashMap<String, Vec<AuditEntry>>>,

    /// Maximum number of entries per principal
    max_entries_per_subject: usize,
}

impl AuditLog {
    /// Creates a new audit log with the specified maximum entries per principal
    pub fn new(max_entries_per_subject: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries_per_subject,
        }
    }

    /// Logs an evaluation
    pub fn log_evaluation(
        &self,
        principal: &str,
        capability: &str,
        node: &NodeRef,
        target: Option<&NodeRef>,
        decision: AccessDecision,
    ) -> EvaluationId {
        let entry = AuditEntry {
            id: EvaluationId::new(),
            timestamp: Utc::now(),
            principal: principal.to_string(),
            capability: capability.to_string(),
            node: *node,
            target: target.copied(),
            decision,
        };
        let id = entry.id;

        let mut entries = self.entries.write();
        let subject_entries = entries.entry(principal.to_string()).or_default();
        subject_entries.push(entry);

        // Trim to max size if needed
        if subject_entries.len() > self.max_entries_per_subject {
            let excess = subject_entries.len() - self.max_entries_per_subject;
            subject_entries.drain(0..excess);
        }
        id
    }

    /// Gets the audit entries for a principal
    pub fn get_entries(&self, principal: &str) -> Vec<AuditEntry> {
        self.entries
            .read()
            .get(principal)
            .cloned()
            .unwrap_or_default()
    }

    /// Gets all audit entries for all principals
    pub fn get_all_entries(&self) -> HashMap<String, Vec<AuditEntry>> {
        self.entries.read().clone()
    }

    /// Clears the audit entries for a principal
    pub fn clear_entries(&self, principal: &str) {
        self.entries.write().remove(principal);
    }

    /// Clears all audit entries
    pub fn clear_all_entries(&self) {
        self.entries.write().clear();
    }

    /// Gets the maximum number of entries per principal
    pub fn max_entries_per_subject(&self) -> usize {
        self.max_entries_per_subject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log() {
        let audit_log = AuditLog::new(10);
        let node = NodeRef::from_u128(1);

        audit_log.log_evaluation("alice", "ViewRecords", &node, None, AccessDecision::Granted);
        audit_log.log_evaluation("alice", "Delete", &node, None, AccessDecision::Denied);
        audit_log.log_evaluation("bob", "ViewRecords", &node, None, AccessDecision::Abstain);

        let entries = audit_log.get_entries("alice");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].decision, AccessDecision::Granted);
        assert_eq!(entries[1].capability, "Delete");
        assert_eq!(audit_log.get_all_entries().len(), 2);

        audit_log.clear_entries("alice");
        assert!(audit_log.get_entries("alice").is_empty());
        assert_eq!(audit_log.get_entries("bob").len(), 1);

        audit_log.clear_all_entries();
        assert!(audit_log.get_all_entries().is_empty());
    }

    #[test]
    fn test_audit_log_max_entries() {
        let audit_log = AuditLog::new(2);

        for i in 0..5u128 {
            audit_log.log_evaluation(
                "alice",
                "ViewRecords",
                &NodeRef::from_u128(i),
                None,
                AccessDecision::Granted,
            );
        }

        // Only the most recent entries are kept, in order
        let entries = audit_log.get_entries("alice");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].node, NodeRef::from_u128(3));
        assert_eq!(entries[1].node, NodeRef::from_u128(4));
    }
}
