use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::error::{RepositoryError, Result};
use crate::id::NodeRef;
use crate::model::*;
use crate::qname::QName;
use crate::traits::{
    DictionaryLookup, DispositionLookup, HoldLookup, IdentityContext, NodeLookup,
    PermissionLookup, RecordClassification,
};
use crate::types::{
    AccessStatus, ChildAssociation, DispositionAction, DispositionSchedule, FilePlanComponentKind,
    PropertyValue,
};

/// Principal name matching every authenticated principal in permission entries.
pub const EVERYONE: &str = "GROUP_EVERYONE";

/// Stored state of one node
#[derive(Debug, Clone)]
struct NodeEntry {
    node_type: QName,
    kind: Option<FilePlanComponentKind>,
    aspects: HashSet<QName>,
    properties: HashMap<QName, PropertyValue>,
}

/// Explicit permission entries on one node: principal -> permission -> status
type AccessControlList = HashMap<String, HashMap<String, AccessStatus>>;

/// An in-memory implementation of every repository collaborator trait
///
/// Permissions are evaluated for the principal reported by the identity
/// context. Entries are inherited along primary parent associations; the
/// closest explicit entry wins and the system principal is allowed
/// everything.
pub struct InMemoryRepository {
    /// Node state
    nodes: DashMap<NodeRef, NodeEntry>,

    /// Associations in which the key is the child
    parents: DashMap<NodeRef, Vec<ChildAssociation>>,

    /// Associations in which the key is the parent
    children: DashMap<NodeRef, Vec<ChildAssociation>>,

    /// Dictionary: type -> direct supertype
    supertypes: DashMap<QName, QName>,

    /// Access control lists by node
    acls: DashMap<NodeRef, AccessControlList>,

    /// Disposition schedules by the node they are attached to
    schedules: DashMap<NodeRef, DispositionSchedule>,

    /// Next pending disposition action by node
    next_actions: DashMap<NodeRef, DispositionAction>,

    /// Completed disposition actions by node, oldest first
    completed_actions: DashMap<NodeRef, Vec<DispositionAction>>,

    /// Registered file plan roots
    file_plans: DashMap<NodeRef, ()>,

    /// Identity the permission checks are made for
    identity: Arc<dyn IdentityContext>,
}

impl InMemoryRepository {
    /// Creates an empty repository with the standard dictionary loaded
    pub fn new(identity: Arc<dyn IdentityContext>) -> Self {
        let repository = Self {
            nodes: DashMap::new(),
            parents: DashMap::new(),
            children: DashMap::new(),
            supertypes: DashMap::new(),
            acls: DashMap::new(),
            schedules: DashMap::new(),
            next_actions: DashMap::new(),
            completed_actions: DashMap::new(),
            file_plans: DashMap::new(),
            identity,
        };

        for folder_type in [
            TYPE_FILE_PLAN,
            TYPE_RECORD_CATEGORY,
            TYPE_RECORD_FOLDER,
            TYPE_HOLD_CONTAINER,
            TYPE_HOLD,
            TYPE_TRANSFER_CONTAINER,
            TYPE_TRANSFER,
            TYPE_UNFILED_RECORD_CONTAINER,
            TYPE_UNFILED_RECORD_FOLDER,
        ] {
            repository.register_type(folder_type, TYPE_FOLDER);
        }
        repository
    }

    /// The identity context permission checks are made for
    pub fn identity(&self) -> &Arc<dyn IdentityContext> {
        &self.identity
    }

    /// Declare `sub_type` as a direct subtype of `super_type`
    pub fn register_type(&self, sub_type: QName, super_type: QName) {
        self.supertypes.insert(sub_type, super_type);
    }

    /// Creates a node under `parent` with a primary `cm:contains` association
    pub fn create_node(
        &self,
        parent: Option<&NodeRef>,
        node_type: QName,
        kind: Option<FilePlanComponentKind>,
        name: &str,
    ) -> Result<NodeRef> {
        if let Some(parent) = parent {
            self.ensure_exists(parent)?;
        }

        let node = NodeRef::new();
        let mut aspects = HashSet::new();
        if kind.is_some() {
            aspects.insert(ASPECT_FILE_PLAN_COMPONENT);
        }
        let mut properties = HashMap::new();
        properties.insert(PROP_NAME, PropertyValue::from(name));

        self.nodes.insert(
            node,
            NodeEntry {
                node_type,
                kind,
                aspects,
                properties,
            },
        );

        if let Some(parent) = parent {
            self.associate(*parent, node, ASSOC_CONTAINS, true);
        }

        trace!(%node, name, "Created node");
        Ok(node)
    }

    /// Creates a file plan root
    pub fn create_file_plan(&self, name: &str) -> Result<NodeRef> {
        let plan = self.create_node(
            None,
            TYPE_FILE_PLAN,
            Some(FilePlanComponentKind::FilePlan),
            name,
        )?;
        self.file_plans.insert(plan, ());
        Ok(plan)
    }

    /// Creates a record category under a file plan or another category
    pub fn create_record_category(&self, parent: &NodeRef, name: &str) -> Result<NodeRef> {
        self.create_node(
            Some(parent),
            TYPE_RECORD_CATEGORY,
            Some(FilePlanComponentKind::RecordCategory),
            name,
        )
    }

    /// Creates an open record folder
    pub fn create_record_folder(&self, parent: &NodeRef, name: &str) -> Result<NodeRef> {
        let folder = self.create_node(
            Some(parent),
            TYPE_RECORD_FOLDER,
            Some(FilePlanComponentKind::RecordFolder),
            name,
        )?;
        self.set_property(&folder, PROP_IS_CLOSED, false)?;
        Ok(folder)
    }

    /// Creates an undeclared record
    pub fn create_record(&self, folder: &NodeRef, name: &str) -> Result<NodeRef> {
        let record = self.create_node(
            Some(folder),
            TYPE_CONTENT,
            Some(FilePlanComponentKind::Record),
            name,
        )?;
        self.add_aspect(&record, ASPECT_RECORD)?;
        Ok(record)
    }

    /// Creates plain content outside the file plan
    pub fn create_content(&self, parent: Option<&NodeRef>, name: &str) -> Result<NodeRef> {
        self.create_node(parent, TYPE_CONTENT, None, name)
    }

    /// Creates a hold, adding the hold container to the file plan on first use
    pub fn create_hold(&self, file_plan: &NodeRef, name: &str) -> Result<NodeRef> {
        let existing = self.find_child_of_kind(file_plan, FilePlanComponentKind::HoldContainer)?;
        let container = match existing {
            Some(container) => container,
            None => self.create_node(
                Some(file_plan),
                TYPE_HOLD_CONTAINER,
                Some(FilePlanComponentKind::HoldContainer),
                "Holds",
            )?,
        };
        self.create_node(
            Some(&container),
            TYPE_HOLD,
            Some(FilePlanComponentKind::Hold),
            name,
        )
    }

    /// Adds a secondary association, e.g. filing a record into a second folder
    pub fn link(&self, parent: &NodeRef, child: &NodeRef, assoc_type: QName) -> Result<()> {
        self.ensure_exists(parent)?;
        self.ensure_exists(child)?;
        self.associate(*parent, *child, assoc_type, false);
        Ok(())
    }

    /// Marks a record as declared
    pub fn declare_record(&self, record: &NodeRef) -> Result<()> {
        self.add_aspect(record, ASPECT_DECLARED_RECORD)
    }

    /// Closes a record folder
    pub fn close_folder(&self, folder: &NodeRef) -> Result<()> {
        self.set_property(folder, PROP_IS_CLOSED, true)
    }

    /// Places a node in a hold
    pub fn add_to_hold(&self, hold: &NodeRef, node: &NodeRef) -> Result<()> {
        self.link(hold, node, ASSOC_FROZEN_CONTENT)?;
        self.add_aspect(node, ASPECT_FROZEN)
    }

    /// Adds an aspect to a node
    pub fn add_aspect(&self, node: &NodeRef, aspect: QName) -> Result<()> {
        let mut entry = self
            .nodes
            .get_mut(node)
            .ok_or(RepositoryError::NodeNotFound(*node))?;
        entry.aspects.insert(aspect);
        Ok(())
    }

    /// Sets a property on a node
    pub fn set_property(
        &self,
        node: &NodeRef,
        property: QName,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        let mut entry = self
            .nodes
            .get_mut(node)
            .ok_or(RepositoryError::NodeNotFound(*node))?;
        entry.properties.insert(property, value.into());
        Ok(())
    }

    /// Sets an explicit permission entry for a principal on a node
    pub fn set_permission(
        &self,
        node: &NodeRef,
        principal: &str,
        permission: &str,
        status: AccessStatus,
    ) -> Result<()> {
        self.ensure_exists(node)?;
        self.acls
            .entry(*node)
            .or_default()
            .entry(principal.to_string())
            .or_default()
            .insert(permission.to_string(), status);
        Ok(())
    }

    /// Allows a set of permissions for a principal on a node and its descendants
    pub fn grant(&self, node: &NodeRef, principal: &str, permissions: &[&str]) -> Result<()> {
        for permission in permissions {
            self.set_permission(node, principal, permission, AccessStatus::Allowed)?;
        }
        Ok(())
    }

    /// Denies a set of permissions for a principal on a node and its descendants
    pub fn deny(&self, node: &NodeRef, principal: &str, permissions: &[&str]) -> Result<()> {
        for permission in permissions {
            self.set_permission(node, principal, permission, AccessStatus::Denied)?;
        }
        Ok(())
    }

    /// Attaches a disposition schedule to a node, usually a category
    pub fn set_disposition_schedule(
        &self,
        node: &NodeRef,
        schedule: DispositionSchedule,
    ) -> Result<()> {
        self.ensure_exists(node)?;
        self.schedules.insert(*node, schedule);
        Ok(())
    }

    /// Sets the next pending disposition action of a node
    pub fn set_next_disposition_action(
        &self,
        node: &NodeRef,
        action: DispositionAction,
    ) -> Result<()> {
        self.ensure_exists(node)?;
        self.next_actions.insert(*node, action);
        Ok(())
    }

    /// Records a completed disposition action on a node
    pub fn complete_disposition_action(
        &self,
        node: &NodeRef,
        action: DispositionAction,
    ) -> Result<()> {
        self.ensure_exists(node)?;
        self.next_actions.remove(node);
        self.completed_actions.entry(*node).or_default().push(action);
        Ok(())
    }

    fn ensure_exists(&self, node: &NodeRef) -> Result<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(RepositoryError::NodeNotFound(*node).into())
        }
    }

    fn entry(&self, node: &NodeRef) -> Result<NodeEntry> {
        self.nodes
            .get(node)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RepositoryError::NodeNotFound(*node).into())
    }

    fn associate(&self, parent: NodeRef, child: NodeRef, assoc_type: QName, is_primary: bool) {
        let assoc = ChildAssociation {
            parent,
            child,
            assoc_type,
            is_primary,
        };
        self.children.entry(parent).or_default().push(assoc.clone());
        self.parents.entry(child).or_default().push(assoc);
    }

    fn find_child_of_kind(
        &self,
        parent: &NodeRef,
        kind: FilePlanComponentKind,
    ) -> Result<Option<NodeRef>> {
        for assoc in self.get_child_associations(parent)? {
            if self.entry(&assoc.child)?.kind == Some(kind) {
                return Ok(Some(assoc.child));
            }
        }
        Ok(None)
    }

    /// The node followed by its primary ancestors, closest first
    fn primary_path(&self, node: &NodeRef) -> Result<Vec<NodeRef>> {
        self.ensure_exists(node)?;
        let mut path = vec![*node];
        let mut current = *node;
        while let Some(parent) = self.get_primary_parent(&current)? {
            if path.contains(&parent.parent) {
                break;
            }
            path.push(parent.parent);
            current = parent.parent;
        }
        Ok(path)
    }

    /// Holds the node is directly frozen in
    fn parent_holds(&self, node: &NodeRef) -> Vec<NodeRef> {
        self.parents
            .get(node)
            .map(|assocs| {
                assocs
                    .iter()
                    .filter(|assoc| assoc.assoc_type == ASSOC_FROZEN_CONTENT)
                    .map(|assoc| assoc.parent)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lookup_acl(&self, node: &NodeRef, principal: &str, permission: &str) -> Option<AccessStatus> {
        let acl = self.acls.get(node)?;
        [principal, EVERYONE]
            .iter()
            .find_map(|p| acl.get(*p).and_then(|perms| perms.get(permission)).copied())
    }
}

impl NodeLookup for InMemoryRepository {
    fn exists(&self, node: &NodeRef) -> Result<bool> {
        Ok(self.nodes.contains_key(node))
    }

    fn get_type(&self, node: &NodeRef) -> Result<QName> {
        Ok(self.entry(node)?.node_type)
    }

    fn has_aspect(&self, node: &NodeRef, aspect: &QName) -> Result<bool> {
        Ok(self.entry(node)?.aspects.contains(aspect))
    }

    fn get_property(&self, node: &NodeRef, property: &QName) -> Result<Option<PropertyValue>> {
        Ok(self.entry(node)?.properties.get(property).cloned())
    }

    fn get_parent_associations(&self, node: &NodeRef) -> Result<Vec<ChildAssociation>> {
        self.ensure_exists(node)?;
        Ok(self
            .parents
            .get(node)
            .map(|assocs| assocs.value().clone())
            .unwrap_or_default())
    }

    fn get_child_associations(&self, node: &NodeRef) -> Result<Vec<ChildAssociation>> {
        self.ensure_exists(node)?;
        Ok(self
            .children
            .get(node)
            .map(|assocs| assocs.value().clone())
            .unwrap_or_default())
    }
}

impl DictionaryLookup for InMemoryRepository {
    fn is_sub_class(&self, class: &QName, of: &QName) -> Result<bool> {
        let mut current = class.clone();
        // Bounded by the number of registered types, which guards cycles
        for _ in 0..=self.supertypes.len() {
            if &current == of {
                return Ok(true);
            }
            match self.supertypes.get(&current) {
                Some(parent) => current = parent.value().clone(),
                None => return Ok(false),
            }
        }
        Ok(false)
    }
}

impl PermissionLookup for InMemoryRepository {
    fn has_permission(&self, node: &NodeRef, permission: &str) -> Result<AccessStatus> {
        let principal = match self.identity.current_user() {
            Some(principal) => principal,
            None => return Ok(AccessStatus::Denied),
        };
        if principal == self.identity.system_user() {
            return Ok(AccessStatus::Allowed);
        }

        for ancestor in self.primary_path(node)? {
            if let Some(status) = self.lookup_acl(&ancestor, &principal, permission) {
                trace!(%node, %ancestor, principal, permission, %status, "Permission entry found");
                return Ok(status);
            }
        }
        Ok(AccessStatus::Denied)
    }
}

impl DispositionLookup for InMemoryRepository {
    fn get_disposition_schedule(&self, node: &NodeRef) -> Result<Option<DispositionSchedule>> {
        for ancestor in self.primary_path(node)? {
            if let Some(schedule) = self.schedules.get(&ancestor) {
                return Ok(Some(schedule.value().clone()));
            }
        }
        Ok(None)
    }

    fn get_next_disposition_action(&self, node: &NodeRef) -> Result<Option<DispositionAction>> {
        self.ensure_exists(node)?;
        Ok(self.next_actions.get(node).map(|a| a.value().clone()))
    }

    fn get_last_completed_disposition_action(
        &self,
        node: &NodeRef,
    ) -> Result<Option<DispositionAction>> {
        self.ensure_exists(node)?;
        Ok(self
            .completed_actions
            .get(node)
            .and_then(|actions| actions.last().cloned()))
    }
}

impl HoldLookup for InMemoryRepository {
    fn held_by(&self, node: &NodeRef, included: bool) -> Result<Vec<NodeRef>> {
        self.ensure_exists(node)?;

        let mut holding: Vec<NodeRef> = self.parent_holds(node);

        // Records are also held by virtue of their record folders
        if self.is_record(node)? {
            for assoc in self.get_parent_associations(node)? {
                if self.is_record_folder(&assoc.parent)? {
                    for hold in self.parent_holds(&assoc.parent) {
                        if !holding.contains(&hold) {
                            holding.push(hold);
                        }
                    }
                }
            }
        }

        if included {
            return Ok(holding);
        }

        let mut not_holding = Vec::new();
        for plan in self.get_file_plans()? {
            if let Some(container) =
                self.find_child_of_kind(&plan, FilePlanComponentKind::HoldContainer)?
            {
                for assoc in self.get_child_associations(&container)? {
                    if self.entry(&assoc.child)?.kind == Some(FilePlanComponentKind::Hold)
                        && !holding.contains(&assoc.child)
                    {
                        not_holding.push(assoc.child);
                    }
                }
            }
        }
        Ok(not_holding)
    }
}

impl RecordClassification for InMemoryRepository {
    fn get_file_plan_component_kind(
        &self,
        node: &NodeRef,
    ) -> Result<Option<FilePlanComponentKind>> {
        Ok(self.entry(node)?.kind)
    }

    fn is_declared(&self, node: &NodeRef) -> Result<bool> {
        let entry = self.entry(node)?;
        Ok(entry.kind == Some(FilePlanComponentKind::Record)
            && entry.aspects.contains(&ASPECT_DECLARED_RECORD))
    }

    fn get_file_plan(&self, node: &NodeRef) -> Result<Option<NodeRef>> {
        for ancestor in self.primary_path(node)? {
            if self.file_plans.contains_key(&ancestor) {
                return Ok(Some(ancestor));
            }
        }
        Ok(None)
    }

    fn get_file_plans(&self) -> Result<Vec<NodeRef>> {
        let mut plans: Vec<NodeRef> = self.file_plans.iter().map(|plan| *plan.key()).collect();
        plans.sort();
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::{run_as_system, AuthenticationStack};

    fn repository(user: &str) -> (Arc<AuthenticationStack>, InMemoryRepository) {
        let identity = Arc::new(AuthenticationStack::authenticated("System", user));
        let repository = InMemoryRepository::new(identity.clone());
        (identity, repository)
    }

    #[test]
    fn test_hierarchy_and_classification() {
        let (_, repo) = repository("alice");
        let plan = repo.create_file_plan("plan").unwrap();
        let category = repo.create_record_category(&plan, "category").unwrap();
        let folder = repo.create_record_folder(&category, "folder").unwrap();
        let record = repo.create_record(&folder, "record").unwrap();

        assert!(repo.is_record(&record).unwrap());
        assert!(repo.is_record_folder(&folder).unwrap());
        assert!(repo.is_record_category(&category).unwrap());
        assert_eq!(repo.get_file_plan(&record).unwrap(), Some(plan));
        assert_eq!(repo.get_file_plans().unwrap(), vec![plan]);
        assert!(!repo.is_declared(&record).unwrap());

        repo.declare_record(&record).unwrap();
        assert!(repo.is_declared(&record).unwrap());

        let parent = repo.get_primary_parent(&record).unwrap().unwrap();
        assert_eq!(parent.parent, folder);
        assert_eq!(parent.assoc_type, ASSOC_CONTAINS);
    }

    #[test]
    fn test_permissions_inherit_and_closest_entry_wins() {
        let (identity, repo) = repository("alice");
        let plan = repo.create_file_plan("plan").unwrap();
        let category = repo.create_record_category(&plan, "category").unwrap();
        let folder = repo.create_record_folder(&category, "folder").unwrap();

        repo.grant(&plan, "alice", &[permissions::FILING]).unwrap();
        repo.deny(&category, "alice", &[permissions::FILING]).unwrap();

        assert_eq!(
            repo.has_permission(&plan, permissions::FILING).unwrap(),
            AccessStatus::Allowed
        );
        assert_eq!(
            repo.has_permission(&folder, permissions::FILING).unwrap(),
            AccessStatus::Denied
        );
        assert_eq!(
            repo.has_permission(&folder, permissions::READ_RECORDS).unwrap(),
            AccessStatus::Denied
        );

        let elevated = run_as_system(identity.as_ref(), || {
            repo.has_permission(&folder, permissions::FILING)
        })
        .unwrap();
        assert_eq!(elevated, AccessStatus::Allowed);
    }

    #[test]
    fn test_everyone_entries_apply_to_all_principals() {
        let (_, repo) = repository("bob");
        let plan = repo.create_file_plan("plan").unwrap();
        repo.grant(&plan, EVERYONE, &[permissions::READ_RECORDS]).unwrap();

        assert!(repo
            .has_permission(&plan, permissions::READ_RECORDS)
            .unwrap()
            .is_allowed());
    }

    #[test]
    fn test_record_held_through_its_folder() {
        let (_, repo) = repository("alice");
        let plan = repo.create_file_plan("plan").unwrap();
        let category = repo.create_record_category(&plan, "category").unwrap();
        let folder = repo.create_record_folder(&category, "folder").unwrap();
        let record = repo.create_record(&folder, "record").unwrap();
        let first = repo.create_hold(&plan, "first").unwrap();
        let second = repo.create_hold(&plan, "second").unwrap();

        assert!(repo.held_by(&record, true).unwrap().is_empty());
        assert_eq!(repo.held_by(&record, false).unwrap().len(), 2);

        repo.add_to_hold(&first, &folder).unwrap();

        assert_eq!(repo.held_by(&record, true).unwrap(), vec![first]);
        assert_eq!(repo.held_by(&record, false).unwrap(), vec![second]);
        assert!(repo.has_aspect(&folder, &ASPECT_FROZEN).unwrap());
    }

    #[test]
    fn test_disposition_schedule_found_on_ancestor() {
        let (_, repo) = repository("alice");
        let plan = repo.create_file_plan("plan").unwrap();
        let category = repo.create_record_category(&plan, "category").unwrap();
        let folder = repo.create_record_folder(&category, "folder").unwrap();

        assert!(repo.get_disposition_schedule(&folder).unwrap().is_none());

        let schedule = DispositionSchedule {
            node: category,
            record_level: false,
            action_definitions: Vec::new(),
        };
        repo.set_disposition_schedule(&category, schedule.clone())
            .unwrap();
        assert_eq!(repo.get_disposition_schedule(&folder).unwrap(), Some(schedule));
    }

    #[test]
    fn test_dictionary_subtypes() {
        let (_, repo) = repository("alice");
        assert!(repo.is_sub_class(&TYPE_RECORD_FOLDER, &TYPE_FOLDER).unwrap());
        assert!(repo.is_sub_class(&TYPE_CONTENT, &TYPE_CONTENT).unwrap());
        assert!(!repo.is_sub_class(&TYPE_RECORD_FOLDER, &TYPE_CONTENT).unwrap());

        let custom = QName::new("acme", "invoice");
        repo.register_type(custom.clone(), TYPE_CONTENT);
        assert!(repo.is_sub_class(&custom, &TYPE_CONTENT).unwrap());
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let (_, repo) = repository("alice");
        let missing = NodeRef::new();
        assert!(matches!(
            repo.get_type(&missing),
            Err(Error::Repository(RepositoryError::NodeNotFound(n))) if n == missing
        ));
        assert!(repo.has_permission(&missing, permissions::READ).is_err());
        assert!(!repo.exists(&missing).unwrap());
    }
}
