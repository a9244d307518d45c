//! Entry policy evaluation.
//!
//! Each policy reads the arguments it needs from the invocation and asks
//! the capability service for a decision. A policy that cannot find the
//! node it tests abstains, which the voter turns into a denial.

use fileplan_capability::{names, AccessDecision, CapabilityService, UpdatePayload};
use fileplan_core::model::PROP_HOLD_REASON;
use fileplan_core::{NodeRef, PropertyValue, Result};
use tracing::debug;

use super::Arguments;
use crate::model::{ArgumentRef, EntryPolicy};

/// Evaluates entry policies against one invocation.
pub struct PolicyEvaluator<'a> {
    service: &'a CapabilityService,
    arguments: &'a Arguments<'a>,
}

impl<'a> PolicyEvaluator<'a> {
    /// Create an evaluator.
    ///
    /// # Arguments
    ///
    /// * `service` - The capability service making the decisions.
    /// * `arguments` - The invocation arguments.
    pub fn new(service: &'a CapabilityService, arguments: &'a Arguments<'a>) -> Self {
        Self { service, arguments }
    }

    /// Evaluate a policy.
    ///
    /// # Arguments
    ///
    /// * `policy` - The policy to evaluate.
    /// * `params` - The argument references from the directive.
    ///
    /// # Returns
    ///
    /// * `Ok(AccessDecision)` - The policy's decision.
    /// * `Err` - If a collaborator failed, an argument had the wrong shape
    ///   or a capability the policy needs is not registered.
    pub fn evaluate(&self, policy: EntryPolicy, params: &[ArgumentRef]) -> Result<AccessDecision> {
        let decision = match policy {
            EntryPolicy::Read | EntryPolicy::Assoc => {
                self.on_test_node(params, names::VIEW_RECORDS)?
            }
            EntryPolicy::Create => self.create(params)?,
            EntryPolicy::Move => self.move_node(params)?,
            EntryPolicy::Update => self.update(params)?,
            EntryPolicy::Delete => self.delete(params)?,
            EntryPolicy::UpdateProperties => self.update_properties(params)?,
            EntryPolicy::WriteContent => self.on_test_node(params, names::WRITE_CONTENT)?,
            EntryPolicy::Capability => {
                self.on_test_node(params, names::MANAGE_ACCESS_CONTROLS)?
            }
            EntryPolicy::Declare => self.on_test_node(params, names::DECLARE)?,
            EntryPolicy::ReadProperty => self.read_property(params)?,
        };
        debug!(policy = %policy, %decision, "Entry policy evaluated");
        Ok(decision)
    }

    fn param(params: &[ArgumentRef], position: usize) -> Option<ArgumentRef> {
        params.get(position).copied()
    }

    fn test_node(&self, params: &[ArgumentRef], position: usize) -> Result<Option<NodeRef>> {
        match Self::param(params, position) {
            Some(reference) => self.arguments.test_node(reference, false),
            None => Ok(None),
        }
    }

    /// Arguments given as the file plan do not count as a node here.
    fn direct_node(&self, params: &[ArgumentRef], position: usize) -> Result<Option<NodeRef>> {
        match Self::param(params, position) {
            Some(reference) => self.arguments.node(reference),
            None => Ok(None),
        }
    }

    fn on_test_node(&self, params: &[ArgumentRef], capability: &str) -> Result<AccessDecision> {
        match self.test_node(params, 0)? {
            Some(node) => self.service.evaluate(capability, &node),
            None => Ok(AccessDecision::Abstain),
        }
    }

    fn create(&self, params: &[ArgumentRef]) -> Result<AccessDecision> {
        let destination = match self.test_node(params, 0)? {
            Some(destination) => destination,
            None => return Ok(AccessDecision::Abstain),
        };

        let (node_type, linkee) = match Self::param(params, 1) {
            Some(reference) => (
                self.arguments.node_type(reference)?,
                self.arguments.node(reference)?,
            ),
            None => (None, None),
        };
        let assoc_type = match Self::param(params, 2) {
            Some(reference) => self.arguments.node_type(reference)?,
            None => None,
        };

        self.service.evaluate_create(
            &destination,
            linkee.as_ref(),
            node_type.as_ref(),
            assoc_type.as_ref(),
        )
    }

    fn move_node(&self, params: &[ArgumentRef]) -> Result<AccessDecision> {
        let movee = self.direct_node(params, 0)?;
        let destination = self.direct_node(params, 1)?;
        match (movee, destination) {
            (Some(movee), Some(destination)) => {
                self.service.evaluate_move(&movee, Some(&destination))
            }
            _ => {
                debug!("Denied: move without movee or destination");
                Ok(AccessDecision::Denied)
            }
        }
    }

    fn update(&self, params: &[ArgumentRef]) -> Result<AccessDecision> {
        let updatee = match self.test_node(params, 0)? {
            Some(updatee) => updatee,
            None => return Ok(AccessDecision::Abstain),
        };

        let mut payload = UpdatePayload::new();
        if let Some(reference) = Self::param(params, 1) {
            if let Some(aspect) = self.arguments.qname(reference)? {
                payload = payload.aspect(aspect);
            }
        }
        if let Some(reference) = Self::param(params, 2) {
            if let Some(properties) = self.arguments.properties(reference)? {
                payload.properties = properties;
            }
        }

        self.service.evaluate_update(names::UPDATE, &updatee, &payload)
    }

    fn delete(&self, params: &[ArgumentRef]) -> Result<AccessDecision> {
        match self.direct_node(params, 0)? {
            Some(deletee) => self.service.evaluate(names::DELETE, &deletee),
            None => {
                debug!("Denied: delete without deletee");
                Ok(AccessDecision::Denied)
            }
        }
    }

    /// The second argument is either a single property name, with its value
    /// in the third, or a whole property map.
    fn update_properties(&self, params: &[ArgumentRef]) -> Result<AccessDecision> {
        let updatee = match self.test_node(params, 0)? {
            Some(updatee) => updatee,
            None => return Ok(AccessDecision::Abstain),
        };

        let mut payload = UpdatePayload::new();
        if let Some(reference) = Self::param(params, 1) {
            match self.arguments.qname(reference) {
                Ok(Some(property)) => {
                    let value = match Self::param(params, 2) {
                        Some(value) => self.arguments.value(value)?,
                        None => None,
                    };
                    payload = payload.property(property, value.unwrap_or(PropertyValue::Null));
                }
                Ok(None) => {}
                Err(_) => {
                    if let Some(properties) = self.arguments.properties(reference)? {
                        payload.properties = properties;
                    }
                }
            }
        }

        self.service
            .evaluate_update(names::UPDATE_PROPERTIES, &updatee, &payload)
    }

    fn read_property(&self, params: &[ArgumentRef]) -> Result<AccessDecision> {
        let node = match self.test_node(params, 0)? {
            Some(node) => node,
            None => return Ok(AccessDecision::Abstain),
        };
        let property = match Self::param(params, 1) {
            Some(reference) => self.arguments.qname(reference)?,
            None => None,
        };

        if property.as_ref() == Some(&PROP_HOLD_REASON) {
            self.service
                .evaluate(names::VIEW_UPDATE_REASONS_FOR_FREEZE, &node)
        } else {
            Ok(AccessDecision::Granted)
        }
    }
}
