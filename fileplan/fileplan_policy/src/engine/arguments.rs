//! Reading invocation arguments.

use fileplan_core::error::PolicyError;
use fileplan_core::{NodeRef, PropertyMap, PropertyValue, QName, Result, Services};

use crate::model::{Argument, ArgumentRef, Invocation};

/// Resolves directive argument references against an invocation.
pub struct Arguments<'a> {
    services: &'a Services,
    invocation: &'a Invocation,
}

impl<'a> Arguments<'a> {
    /// Create a resolver over an invocation.
    pub fn new(services: &'a Services, invocation: &'a Invocation) -> Self {
        Self {
            services,
            invocation,
        }
    }

    /// The invocation being resolved.
    pub fn invocation(&self) -> &'a Invocation {
        self.invocation
    }

    fn argument(&self, reference: ArgumentRef) -> Option<&'a Argument> {
        reference
            .index()
            .and_then(|index| self.invocation.argument(index))
    }

    /// The node a directive tests.
    ///
    /// The file plan reference resolves to the first file plan. A node
    /// argument resolves to itself, or to its primary parent when `parent`
    /// is set; an association resolves to its child (or target), or to its
    /// parent (or source). Every other argument has no test node.
    pub fn test_node(&self, reference: ArgumentRef, parent: bool) -> Result<Option<NodeRef>> {
        if reference == ArgumentRef::FilePlan {
            return Ok(self.services.records.get_file_plans()?.into_iter().next());
        }

        let node = match self.argument(reference) {
            Some(Argument::Node(node)) if parent => self
                .services
                .nodes
                .get_primary_parent(node)?
                .map(|assoc| assoc.parent),
            Some(Argument::Node(node)) => Some(*node),
            Some(Argument::ChildAssociation(assoc)) if parent => Some(assoc.parent),
            Some(Argument::ChildAssociation(assoc)) => Some(assoc.child),
            Some(Argument::Association { source, .. }) if parent => Some(*source),
            Some(Argument::Association { target, .. }) => Some(*target),
            _ => None,
        };
        Ok(node)
    }

    /// The node an argument holds directly, ignoring the file plan reference.
    pub fn node(&self, reference: ArgumentRef) -> Result<Option<NodeRef>> {
        if reference == ArgumentRef::FilePlan {
            return Ok(None);
        }
        self.test_node(reference, false)
    }

    /// The type an argument names: a qualified name, or the type of a node.
    pub fn node_type(&self, reference: ArgumentRef) -> Result<Option<QName>> {
        match self.argument(reference) {
            Some(Argument::QName(name)) => Ok(Some(name.clone())),
            Some(Argument::Node(node)) => Ok(Some(self.services.nodes.get_type(node)?)),
            _ => Ok(None),
        }
    }

    /// A qualified name argument.
    pub fn qname(&self, reference: ArgumentRef) -> Result<Option<QName>> {
        match self.argument(reference) {
            None | Some(Argument::Null) => Ok(None),
            Some(Argument::QName(name)) => Ok(Some(name.clone())),
            Some(_) => Err(mismatch(reference, "a qualified name")),
        }
    }

    /// A property map argument.
    pub fn properties(&self, reference: ArgumentRef) -> Result<Option<PropertyMap>> {
        match self.argument(reference) {
            None | Some(Argument::Null) => Ok(None),
            Some(Argument::Properties(properties)) => Ok(Some(properties.clone())),
            Some(_) => Err(mismatch(reference, "a property map")),
        }
    }

    /// A single property value argument; nodes and names are accepted as values.
    pub fn value(&self, reference: ArgumentRef) -> Result<Option<PropertyValue>> {
        match self.argument(reference) {
            None | Some(Argument::Null) => Ok(None),
            Some(Argument::Value(value)) => Ok(Some(value.clone())),
            Some(Argument::Node(node)) => Ok(Some(PropertyValue::Node(*node))),
            Some(Argument::QName(name)) => Ok(Some(PropertyValue::Text(name.to_string()))),
            Some(_) => Err(mismatch(reference, "a property value")),
        }
    }
}

fn mismatch(reference: ArgumentRef, expected: &str) -> fileplan_core::Error {
    PolicyError::ArgumentMismatch {
        index: reference.index().unwrap_or_default(),
        expected: expected.to_string(),
    }
    .into()
}
