//! The after-invocation result filter.
//!
//! A method guarded with `RM_QUERY` is let through by the entry voter and
//! its result is filtered here instead. Single nodes and associations the
//! principal may not read fail the call; collections lose the entries the
//! principal may not read. Nodes outside the file plan are never filtered.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fileplan_capability::{names, CapabilityService};
use fileplan_core::error::PolicyError;
use fileplan_core::{EngineConfig, LogLevel, NodeRef, Result};
use tracing::debug;

use crate::model::{FilterDirective, Returned};

/// A filtered return value.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    /// What the caller may see.
    pub value: Returned,

    /// Whether a check bound stopped the filter before the end of a list.
    pub cut_off: bool,

    /// List entries dropped unchecked because of a cut-off.
    pub checks_remaining: usize,
}

impl Filtered {
    fn unchanged(value: Returned) -> Self {
        Self {
            value,
            cut_off: false,
            checks_remaining: 0,
        }
    }
}

/// Filters the values guarded methods return by read capability.
#[derive(Clone)]
pub struct ResultFilter {
    service: Arc<CapabilityService>,
    max_permission_checks: Option<usize>,
    max_check_time: Option<Duration>,
}

impl ResultFilter {
    /// An unbounded filter over a capability service.
    pub fn new(service: Arc<CapabilityService>) -> Self {
        Self {
            service,
            max_permission_checks: None,
            max_check_time: None,
        }
    }

    /// A filter bounded by the configured check count and time.
    pub fn from_config(service: Arc<CapabilityService>, config: &EngineConfig) -> Self {
        let bounds = &config.after_invocation;
        Self::new(service)
            .with_max_permission_checks(bounds.max_permission_checks)
            .with_max_check_time(bounds.max_permission_check_time_ms.map(Duration::from_millis))
    }

    /// Stop checking a list after this many entries.
    pub fn with_max_permission_checks(mut self, max: Option<usize>) -> Self {
        self.max_permission_checks = max;
        self
    }

    /// Stop checking a list once this much time has passed.
    pub fn with_max_check_time(mut self, max: Option<Duration>) -> Self {
        self.max_check_time = max;
        self
    }

    /// Filter a returned value.
    ///
    /// # Arguments
    ///
    /// * `returned` - The value the guarded method returned.
    /// * `directives` - The raw directives guarding it. Only `AFTER_RM`
    ///   directives are used.
    ///
    /// # Returns
    ///
    /// * `Ok(Filtered)` - What the principal may see.
    /// * `Err` - `PolicyError::AccessDenied` for a single value the principal
    ///   may not read, `PolicyError::UnsupportedReturn` for a list entry
    ///   carrying no node, or a malformed directive.
    pub fn filter<S: AsRef<str>>(&self, returned: Returned, directives: &[S]) -> Result<Filtered> {
        let directives = FilterDirective::parse_all(directives)?;
        self.filter_directives(returned, &directives)
    }

    /// Filter a returned value with directives that are already parsed.
    pub fn filter_directives(
        &self,
        returned: Returned,
        directives: &[FilterDirective],
    ) -> Result<Filtered> {
        if directives.is_empty() || self.service.services().identity.is_system_user() {
            return Ok(Filtered::unchanged(returned));
        }

        match returned {
            Returned::Node(node) => {
                self.check_node(&node, directives)?;
                Ok(Filtered::unchanged(Returned::Node(node)))
            }
            Returned::ChildAssociation(assoc) => {
                self.check_pair(&assoc.parent, &assoc.child, directives)?;
                Ok(Filtered::unchanged(Returned::ChildAssociation(assoc)))
            }
            Returned::Association { source, target } => {
                self.check_pair(&source, &target, directives)?;
                Ok(Filtered::unchanged(Returned::Association { source, target }))
            }
            Returned::List(entries) => self.filter_list(entries, directives),
            Returned::Map(sets) => {
                let mut cut_off = false;
                let mut checks_remaining = 0;
                let mut filtered = BTreeMap::new();
                for (key, set) in sets {
                    let result = self.filter_directives(set, directives)?;
                    cut_off |= result.cut_off;
                    checks_remaining += result.checks_remaining;
                    filtered.insert(key, result.value);
                }
                Ok(Filtered {
                    value: Returned::Map(filtered),
                    cut_off,
                    checks_remaining,
                })
            }
            other @ (Returned::Null | Returned::Value(_)) => Ok(Filtered::unchanged(other)),
        }
    }

    fn can_read(&self, node: &NodeRef) -> Result<bool> {
        Ok(self
            .service
            .evaluate(names::VIEW_RECORDS, node)?
            .is_granted())
    }

    fn is_filtered(&self, node: &NodeRef) -> Result<bool> {
        self.service.services().records.is_file_plan_component(node)
    }

    fn primary_parent(&self, node: &NodeRef) -> Result<Option<NodeRef>> {
        Ok(self
            .service
            .services()
            .nodes
            .get_primary_parent(node)?
            .map(|assoc| assoc.parent))
    }

    fn check_node(&self, node: &NodeRef, directives: &[FilterDirective]) -> Result<()> {
        if !self.is_filtered(node)? {
            return Ok(());
        }
        for directive in directives {
            let test = if directive.parent {
                self.primary_parent(node)?
            } else {
                Some(*node)
            };
            if let Some(test) = test {
                if !self.can_read(&test)? {
                    return Err(PolicyError::AccessDenied(node.to_string()).into());
                }
            }
        }
        Ok(())
    }

    fn check_pair(
        &self,
        parent: &NodeRef,
        child: &NodeRef,
        directives: &[FilterDirective],
    ) -> Result<()> {
        for directive in directives {
            let test = if directive.parent { parent } else { child };
            if self.is_filtered(test)? && !self.can_read(test)? {
                return Err(PolicyError::AccessDenied(test.to_string()).into());
            }
        }
        Ok(())
    }

    fn filter_list(&self, entries: Vec<Returned>, directives: &[FilterDirective]) -> Result<Filtered> {
        let started = Instant::now();
        let total = entries.len();
        let mut checked = 0;
        let mut cut_off = false;
        let mut kept = Vec::with_capacity(total);

        for entry in entries {
            if self.max_permission_checks.map_or(false, |max| checked >= max) {
                cut_off = true;
                break;
            }
            if self
                .max_check_time
                .map_or(false, |max| started.elapsed() > max)
            {
                cut_off = true;
                break;
            }
            if self.entry_allowed(&entry, directives)? {
                kept.push(entry);
            }
            checked += 1;
        }

        if self.service.log_level().enables(LogLevel::Debug) {
            debug!(
                total,
                checked,
                kept = kept.len(),
                cut_off,
                "Filtered returned list"
            );
        }
        Ok(Filtered {
            value: Returned::List(kept),
            cut_off,
            checks_remaining: total - checked,
        })
    }

    fn entry_allowed(&self, entry: &Returned, directives: &[FilterDirective]) -> Result<bool> {
        if let Returned::Node(node) = entry {
            if !self.service.services().nodes.exists(node)? {
                return Ok(false);
            }
        }
        for directive in directives.iter().filter(|d| d.filters_entries()) {
            let test = match self.entry_test_node(entry, directive.parent)? {
                Some(test) => test,
                None => continue,
            };
            if self.is_filtered(&test)? && !self.can_read(&test)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn entry_test_node(&self, entry: &Returned, parent: bool) -> Result<Option<NodeRef>> {
        match entry {
            Returned::Null => Ok(None),
            Returned::Node(node) if parent => self.primary_parent(node),
            Returned::Node(node) => Ok(Some(*node)),
            Returned::ChildAssociation(assoc) if parent => Ok(Some(assoc.parent)),
            Returned::ChildAssociation(assoc) => Ok(Some(assoc.child)),
            Returned::Association { source, .. } if parent => Ok(Some(*source)),
            Returned::Association { target, .. } => Ok(Some(*target)),
            other => Err(PolicyError::UnsupportedReturn(other.kind().to_string()).into()),
        }
    }
}
