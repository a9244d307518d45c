//! Method invocations presented to the entry voter.

use fileplan_core::{ChildAssociation, NodeRef, PropertyMap, PropertyValue, QName};
use serde::{Deserialize, Serialize};

/// A typed invocation argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Argument {
    /// A node.
    Node(NodeRef),

    /// A parent-child association.
    ChildAssociation(ChildAssociation),

    /// A peer association from a source node to a target node.
    Association {
        /// The source node.
        source: NodeRef,

        /// The target node.
        target: NodeRef,
    },

    /// A type, aspect or property name.
    QName(QName),

    /// A property map.
    Properties(PropertyMap),

    /// A single property value.
    Value(PropertyValue),

    /// An absent argument.
    Null,
}

impl Argument {
    /// Whether the argument is absent.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short description of the argument's shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Node(_) => "node",
            Self::ChildAssociation(_) => "child association",
            Self::Association { .. } => "association",
            Self::QName(_) => "qualified name",
            Self::Properties(_) => "property map",
            Self::Value(_) => "property value",
            Self::Null => "null",
        }
    }
}

impl From<NodeRef> for Argument {
    fn from(node: NodeRef) -> Self {
        Self::Node(node)
    }
}

impl From<ChildAssociation> for Argument {
    fn from(assoc: ChildAssociation) -> Self {
        Self::ChildAssociation(assoc)
    }
}

impl From<QName> for Argument {
    fn from(name: QName) -> Self {
        Self::QName(name)
    }
}

impl From<PropertyMap> for Argument {
    fn from(properties: PropertyMap) -> Self {
        Self::Properties(properties)
    }
}

impl From<PropertyValue> for Argument {
    fn from(value: PropertyValue) -> Self {
        Self::Value(value)
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A guarded method call: the method name and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// The method name.
    pub method: String,

    /// The arguments, by position.
    pub arguments: Vec<Argument>,
}

impl Invocation {
    /// An invocation without arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// The argument at `index`, if any.
    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(index)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}
