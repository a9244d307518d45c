//! Repository lookups consumed by the capability engine.

use crate::error::Result;
use crate::id::NodeRef;
use crate::model::{PROP_CREATOR, PROP_OWNER};
use crate::qname::QName;
use crate::types::{
    AccessStatus, ChildAssociation, DispositionAction, DispositionSchedule, FilePlanComponentKind,
    PropertyValue,
};

/// Read access to node structure and metadata.
pub trait NodeLookup: Send + Sync {
    /// Whether the node exists.
    fn exists(&self, node: &NodeRef) -> Result<bool>;

    /// The node's dictionary type.
    fn get_type(&self, node: &NodeRef) -> Result<QName>;

    /// Whether the node carries the given aspect.
    fn has_aspect(&self, node: &NodeRef, aspect: &QName) -> Result<bool>;

    /// A single property value, `None` when unset.
    fn get_property(&self, node: &NodeRef, property: &QName) -> Result<Option<PropertyValue>>;

    /// All associations in which the node is the child.
    fn get_parent_associations(&self, node: &NodeRef) -> Result<Vec<ChildAssociation>>;

    /// All associations in which the node is the parent.
    fn get_child_associations(&self, node: &NodeRef) -> Result<Vec<ChildAssociation>>;

    /// The primary parent association, if the node has one.
    fn get_primary_parent(&self, node: &NodeRef) -> Result<Option<ChildAssociation>> {
        Ok(self
            .get_parent_associations(node)?
            .into_iter()
            .find(|assoc| assoc.is_primary))
    }

    /// The recorded owner of the node, falling back to its creator.
    fn get_owner(&self, node: &NodeRef) -> Result<Option<String>> {
        for property in [&PROP_OWNER, &PROP_CREATOR] {
            if let Some(PropertyValue::Text(owner)) = self.get_property(node, property)? {
                return Ok(Some(owner));
            }
        }
        Ok(None)
    }
}

/// Read access to the type hierarchy of the data dictionary.
pub trait DictionaryLookup: Send + Sync {
    /// Whether `class` is `of` or a subtype of it.
    fn is_sub_class(&self, class: &QName, of: &QName) -> Result<bool>;
}

/// Permission checks for the current principal.
pub trait PermissionLookup: Send + Sync {
    /// Whether the current principal holds `permission` on `node`.
    fn has_permission(&self, node: &NodeRef, permission: &str) -> Result<AccessStatus>;
}

/// Read access to disposition schedules and actions.
pub trait DispositionLookup: Send + Sync {
    /// The schedule governing the node, if any.
    fn get_disposition_schedule(&self, node: &NodeRef) -> Result<Option<DispositionSchedule>>;

    /// The next pending disposition action, if any.
    fn get_next_disposition_action(&self, node: &NodeRef) -> Result<Option<DispositionAction>>;

    /// The most recently completed disposition action, if any.
    fn get_last_completed_disposition_action(
        &self,
        node: &NodeRef,
    ) -> Result<Option<DispositionAction>>;
}

/// Read access to legal holds.
pub trait HoldLookup: Send + Sync {
    /// With `included` set, the holds the node is in; otherwise the holds
    /// of the node's file plan that it is not in.
    fn held_by(&self, node: &NodeRef, included: bool) -> Result<Vec<NodeRef>>;
}

/// Records-management classification of nodes.
pub trait RecordClassification: Send + Sync {
    /// The file-plan component kind, `None` for nodes outside any file plan.
    fn get_file_plan_component_kind(&self, node: &NodeRef)
        -> Result<Option<FilePlanComponentKind>>;

    /// Whether the record has been declared complete.
    fn is_declared(&self, node: &NodeRef) -> Result<bool>;

    /// The file plan that contains the node.
    fn get_file_plan(&self, node: &NodeRef) -> Result<Option<NodeRef>>;

    /// Every file plan root, in a stable order.
    fn get_file_plans(&self) -> Result<Vec<NodeRef>>;

    /// Whether the node is part of a file plan.
    fn is_file_plan_component(&self, node: &NodeRef) -> Result<bool> {
        Ok(self.get_file_plan_component_kind(node)?.is_some())
    }

    /// Whether the node is a record.
    fn is_record(&self, node: &NodeRef) -> Result<bool> {
        Ok(self.get_file_plan_component_kind(node)? == Some(FilePlanComponentKind::Record))
    }

    /// Whether the node is a record folder.
    fn is_record_folder(&self, node: &NodeRef) -> Result<bool> {
        Ok(self.get_file_plan_component_kind(node)? == Some(FilePlanComponentKind::RecordFolder))
    }

    /// Whether the node is a record category.
    fn is_record_category(&self, node: &NodeRef) -> Result<bool> {
        Ok(self.get_file_plan_component_kind(node)?
            == Some(FilePlanComponentKind::RecordCategory))
    }
}
