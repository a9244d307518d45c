//! The method-entry voter.

use std::sync::Arc;

use fileplan_capability::{AccessDecision, CapabilityService};
use fileplan_core::{EngineConfig, LogLevel, Result, Services};
use tracing::{debug, info};

use super::{Arguments, PolicyEvaluator, VoteAudit};
use crate::model::{Directive, Invocation, Vote};

/// Votes on method invocations guarded by security directives.
///
/// The directives are checked in order. Fixed directives settle the vote
/// immediately; capability and policy directives must all grant for the
/// vote to grant, and the first that does not turns the vote into a
/// denial. Directives whose leading argument positions lie beyond the
/// invocation's arguments are skipped.
#[derive(Clone)]
pub struct EntryVoter {
    /// The capability service making the decisions.
    service: Arc<CapabilityService>,

    /// Vote history, when enabled.
    audit: Option<Arc<VoteAudit>>,
}

impl EntryVoter {
    /// Create a voter over a capability service, without auditing.
    pub fn new(service: Arc<CapabilityService>) -> Self {
        Self {
            service,
            audit: None,
        }
    }

    /// Create a voter from configuration.
    ///
    /// # Arguments
    ///
    /// * `services` - The repository collaborators.
    /// * `config` - The engine configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(EntryVoter)` - The voter, auditing votes when the configuration
    ///   enables it.
    /// * `Err` - If the configuration or its capability catalog is invalid.
    pub fn from_config(services: Services, config: &EngineConfig) -> Result<Self> {
        let service = CapabilityService::from_config(services, config)?;
        let mut voter = Self::new(Arc::new(service));
        if config.audit.enabled {
            voter.audit = Some(Arc::new(VoteAudit::new(config.audit.max_entries_per_subject)));
        }
        info!(audit = config.audit.enabled, "Entry voter ready");
        Ok(voter)
    }

    /// Record votes in the given audit.
    pub fn with_audit(mut self, audit: Arc<VoteAudit>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// The capability service.
    pub fn service(&self) -> &Arc<CapabilityService> {
        &self.service
    }

    /// The vote audit, if enabled.
    pub fn audit(&self) -> Option<&Arc<VoteAudit>> {
        self.audit.as_ref()
    }

    /// Vote on an invocation.
    ///
    /// # Arguments
    ///
    /// * `invocation` - The guarded call.
    /// * `directives` - The raw directives guarding it, in order. Directives
    ///   the voter does not handle are ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The vote.
    /// * `Err` - If a directive is malformed or names an unknown policy or
    ///   capability, or a collaborator failed.
    pub fn vote<S: AsRef<str>>(&self, invocation: &Invocation, directives: &[S]) -> Result<Vote> {
        if self.service.services().identity.is_system_user() {
            return Ok(self.finish(invocation, AccessDecision::Granted, None));
        }
        let directives = Directive::parse_all(directives)?;
        self.vote_directives(invocation, &directives)
    }

    /// Vote on an invocation with directives that are already parsed.
    pub fn vote_directives(&self, invocation: &Invocation, directives: &[Directive]) -> Result<Vote> {
        let services = self.service.services();
        if services.identity.is_system_user() {
            return Ok(self.finish(invocation, AccessDecision::Granted, None));
        }
        if directives.is_empty() {
            return Ok(self.finish(invocation, AccessDecision::Abstain, None));
        }

        let arguments = Arguments::new(services, invocation);
        let policies = PolicyEvaluator::new(&self.service, &arguments);

        for directive in directives {
            if directive
                .leading_arguments()
                .iter()
                .any(|reference| reference.is_out_of_range(invocation.len()))
            {
                if self.logs_debug() {
                    debug!(method = %invocation.method, %directive, "Skipping: argument out of range");
                }
                continue;
            }

            let decision = match directive {
                Directive::Deny => AccessDecision::Denied,
                Directive::Abstain => AccessDecision::Abstain,
                Directive::Allow | Directive::Query => AccessDecision::Granted,
                Directive::Capability {
                    argument,
                    capability,
                    parent,
                    ..
                } => {
                    let decision = match arguments.test_node(*argument, *parent)? {
                        Some(node) => self.service.evaluate(capability, &node)?,
                        None => AccessDecision::Abstain,
                    };
                    if decision.is_granted() {
                        continue;
                    }
                    AccessDecision::Denied
                }
                Directive::Policy {
                    policy,
                    arguments: params,
                } => {
                    if policies.evaluate(*policy, params)?.is_granted() {
                        continue;
                    }
                    AccessDecision::Denied
                }
            };
            return Ok(self.finish(invocation, decision, Some(directive.to_string())));
        }

        Ok(self.finish(invocation, AccessDecision::Granted, None))
    }

    fn logs_debug(&self) -> bool {
        self.service.log_level().enables(LogLevel::Debug)
    }

    fn finish(
        &self,
        invocation: &Invocation,
        decision: AccessDecision,
        decided_by: Option<String>,
    ) -> Vote {
        let principal = self
            .service
            .services()
            .identity
            .current_user()
            .unwrap_or_default();
        if self.logs_debug() {
            debug!(
                %principal,
                method = %invocation.method,
                %decision,
                decided_by = decided_by.as_deref().unwrap_or("-"),
                "Entry vote"
            );
        }
        let vote = Vote::new(principal, invocation.method.clone(), decision, decided_by);
        if let Some(audit) = &self.audit {
            audit.record(vote.clone());
        }
        vote
    }
}
