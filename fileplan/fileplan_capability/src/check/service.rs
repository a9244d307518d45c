//! The capability evaluation entry point.

use std::collections::BTreeMap;
use std::sync::Arc;

use fileplan_core::{AccessStatus, EngineConfig, LogLevel, NodeRef, QName, Result, Services};
use tracing::{debug, info};

use super::audit::AuditLog;
use super::context::EvaluationContext;
use crate::catalog::Catalog;
use crate::condition::ConditionRegistry;
use crate::model::{names, AccessDecision, Capability, UpdatePayload};
use crate::registry::CapabilityRegistry;

/// Default bound on capability delegation depth
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 8;

/// Evaluates named capabilities against nodes for the current principal
///
/// Every evaluation is a read-only traversal over the collaborators in
/// [`Services`]; the service itself holds no per-request state, so one
/// instance can serve concurrent requests. Elevation to the system
/// principal during an evaluation is only seen by the evaluating thread.
pub struct CapabilityService {
    /// Host collaborators
    services: Services,

    /// Named capabilities
    capabilities: Arc<CapabilityRegistry>,

    /// Named conditions
    conditions: Arc<ConditionRegistry>,

    /// Bound on delegation depth
    max_delegation_depth: usize,

    /// Optional audit log for recording evaluations
    audit_log: Option<Arc<AuditLog>>,

    /// Verbosity of per-evaluation events
    log_level: LogLevel,
}

impl CapabilityService {
    /// Creates a service over populated registries
    pub fn new(
        services: Services,
        capabilities: Arc<CapabilityRegistry>,
        conditions: Arc<ConditionRegistry>,
    ) -> Self {
        Self {
            services,
            capabilities,
            conditions,
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
            audit_log: None,
            log_level: LogLevel::default(),
        }
    }

    /// Creates a service from configuration, installing the configured
    /// catalog or the built-in one
    pub fn from_config(services: Services, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        let (conditions, capabilities) = catalog.build()?;

        let mut service = Self::new(services, Arc::new(capabilities), Arc::new(conditions))
            .with_max_delegation_depth(config.max_delegation_depth)
            .with_log_level(config.log_level);
        if config.audit.enabled {
            service.set_audit_log(Some(Arc::new(AuditLog::new(
                config.audit.max_entries_per_subject,
            ))));
        }

        info!(
            capabilities = service.capabilities.len(),
            conditions = service.conditions.len(),
            max_delegation_depth = service.max_delegation_depth,
            audit = config.audit.enabled,
            log_level = %config.log_level,
            "Capability service ready"
        );
        Ok(service)
    }

    /// Sets the bound on delegation depth
    pub fn with_max_delegation_depth(mut self, depth: usize) -> Self {
        self.max_delegation_depth = depth;
        self
    }

    /// Sets the verbosity of per-evaluation events
    ///
    /// Decisions and delegation are logged at debug level, and skipped
    /// unless `level` enables it.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Records evaluations in `audit_log`
    pub fn with_audit(mut self, audit_log: Arc<AuditLog>) -> Self {
        self.audit_log = Some(audit_log);
        self
    }

    /// Sets the audit log for this service
    pub fn set_audit_log(&mut self, audit_log: Option<Arc<AuditLog>>) {
        self.audit_log = audit_log;
    }

    /// Host collaborators
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Named capabilities
    pub fn capabilities(&self) -> &Arc<CapabilityRegistry> {
        &self.capabilities
    }

    /// Named conditions
    pub fn conditions(&self) -> &Arc<ConditionRegistry> {
        &self.conditions
    }

    /// The audit log, if one is configured
    pub fn audit_log(&self) -> Option<&Arc<AuditLog>> {
        self.audit_log.as_ref()
    }

    /// Verbosity of per-evaluation events
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Bound on delegation depth
    pub fn max_delegation_depth(&self) -> usize {
        self.max_delegation_depth
    }

    /// Looks up a capability by name
    pub fn get_capability(&self, name: &str) -> Result<Arc<Capability>> {
        self.capabilities.get(name)
    }

    fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext::new(
            &self.services,
            &self.conditions,
            &self.capabilities,
            self.max_delegation_depth,
        )
        .with_log_level(self.log_level)
    }

    fn record(
        &self,
        capability: &str,
        node: &NodeRef,
        target: Option<&NodeRef>,
        decision: AccessDecision,
    ) -> AccessDecision {
        if self.log_level.enables(LogLevel::Debug) {
            debug!(capability, %node, %decision, "Evaluated capability");
        }
        if let Some(audit_log) = &self.audit_log {
            let principal = self.services.identity.current_user().unwrap_or_default();
            audit_log.log_evaluation(&principal, capability, node, target, decision);
        }
        decision
    }

    /// Evaluates a capability against one node
    pub fn evaluate(&self, name: &str, node: &NodeRef) -> Result<AccessDecision> {
        let decision = self.context().evaluate(name, node)?;
        Ok(self.record(name, node, None, decision))
    }

    /// Evaluates a capability against a source and an optional target
    pub fn evaluate_pair(
        &self,
        name: &str,
        source: &NodeRef,
        target: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        let decision = self.context().evaluate_pair(name, source, target)?;
        Ok(self.record(name, source, target, decision))
    }

    /// Evaluates creating a node of `node_type`, or linking `linkee`
    /// through `assoc_type`, in `destination`
    pub fn evaluate_create(
        &self,
        destination: &NodeRef,
        linkee: Option<&NodeRef>,
        node_type: Option<&QName>,
        assoc_type: Option<&QName>,
    ) -> Result<AccessDecision> {
        let decision = self.context().evaluate_create(
            names::CREATE,
            destination,
            linkee,
            node_type,
            assoc_type,
        )?;
        Ok(self.record(names::CREATE, destination, linkee, decision))
    }

    /// Evaluates moving `movee`, undetermined without a destination
    pub fn evaluate_move(
        &self,
        movee: &NodeRef,
        destination: Option<&NodeRef>,
    ) -> Result<AccessDecision> {
        self.evaluate_pair(names::MOVE_RECORDS, movee, destination)
    }

    /// Evaluates an update capability for a payload of changes
    pub fn evaluate_update(
        &self,
        name: &str,
        node: &NodeRef,
        payload: &UpdatePayload,
    ) -> Result<AccessDecision> {
        let decision = self.context().evaluate_update(name, node, payload)?;
        Ok(self.record(name, node, None, decision))
    }

    /// The capability decision as an access status
    pub fn has_permission(&self, name: &str, node: &NodeRef) -> Result<AccessStatus> {
        Ok(self.evaluate(name, node)?.to_access_status())
    }

    /// The access status of every capability on a node
    pub fn access_state(
        &self,
        node: &NodeRef,
        include_private: bool,
    ) -> Result<BTreeMap<String, AccessStatus>> {
        let ctx = self.context();
        let mut state = BTreeMap::new();
        for capability in self.capabilities.capabilities(include_private) {
            let decision = ctx.evaluate(capability.name(), node)?;
            state.insert(capability.name().to_string(), decision.to_access_status());
        }
        Ok(state)
    }
}
