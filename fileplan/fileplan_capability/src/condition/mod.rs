//! Capability conditions.
//!
//! A condition is a stateless predicate over one node, evaluated against
//! the host collaborators. Conditions are registered under a name in the
//! [`ConditionRegistry`] and referenced by that name from capability
//! requirements.

pub mod registry;

pub use registry::ConditionRegistry;

use std::collections::BTreeSet;

use fileplan_core::model::{
    permissions, ASPECT_VITAL_RECORD, PROP_DISPOSITION_AS_OF, PROP_VITAL_RECORD_INDICATOR,
    PROP_IS_CLOSED, TYPE_CONTENT,
};
use fileplan_core::{FilePlanComponentKind, NodeRef, QName, Result, Services};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The condition variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// A closed record folder, or a record filed in any closed record folder.
    Closed,

    /// A record that has been declared.
    Declared,

    /// The current principal may file into the node.
    Filling,

    /// Filing is allowed on every direct child.
    FillingOnChildren,

    /// Reading records is allowed on every direct child.
    ReadOnChildren,

    /// The node has a disposition as-of date.
    HasDispositionDate,

    /// The node is held by (or, with `included` unset, not held by) a hold
    /// the current principal may file into.
    Hold {
        /// Direction of the hold lookup.
        included: bool,
    },

    /// A disposition schedule applies to the node.
    IsClassified,

    /// The last completed disposition action has the given name.
    LastDispositionAction {
        /// Action name, e.g. `cutoff`.
        action: String,
    },

    /// The node's schedule is at the node's level and defines the action.
    MayBeScheduled {
        /// Action name, e.g. `destroy`.
        action: String,
    },

    /// A vital record or vital record folder.
    VitalRecordOrFolder,

    /// The node is in at least one hold.
    Frozen {
        /// Also true when any direct child is in a hold.
        #[serde(default)]
        check_children: bool,
    },

    /// The node carries an aspect.
    HasAspect {
        /// The aspect, e.g. `rma:cutOff`.
        aspect: QName,
    },

    /// The node is one of the given file-plan component kinds.
    IsKind {
        /// Accepted kinds.
        kinds: BTreeSet<FilePlanComponentKind>,
    },
}

impl Condition {
    /// The variant name, as used in catalogs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Declared => "declared",
            Self::Filling => "filling",
            Self::FillingOnChildren => "filling_on_children",
            Self::ReadOnChildren => "read_on_children",
            Self::HasDispositionDate => "has_disposition_date",
            Self::Hold { .. } => "hold",
            Self::IsClassified => "is_classified",
            Self::LastDispositionAction { .. } => "last_disposition_action",
            Self::MayBeScheduled { .. } => "may_be_scheduled",
            Self::VitalRecordOrFolder => "vital_record_or_folder",
            Self::Frozen { .. } => "frozen",
            Self::HasAspect { .. } => "has_aspect",
            Self::IsKind { .. } => "is_kind",
        }
    }

    /// Evaluate the condition against `node`.
    pub fn evaluate(&self, services: &Services, node: &NodeRef) -> Result<bool> {
        let result = match self {
            Self::Closed => is_closed(services, node)?,
            Self::Declared => {
                services.records.is_record(node)? && services.records.is_declared(node)?
            }
            Self::Filling => is_filling(services, node)?,
            Self::FillingOnChildren => all_children_allowed(services, node, permissions::FILING)?,
            Self::ReadOnChildren => {
                all_children_allowed(services, node, permissions::READ_RECORDS)?
            }
            Self::HasDispositionDate => has_disposition_date(services, node)?,
            Self::Hold { included } => any_hold_allowed(services, node, *included)?,
            Self::IsClassified => services.dispositions.get_disposition_schedule(node)?.is_some(),
            Self::LastDispositionAction { action } => services
                .dispositions
                .get_last_completed_disposition_action(node)?
                .map_or(false, |last| &last.name == action),
            Self::MayBeScheduled { action } => {
                match services.dispositions.get_disposition_schedule(node)? {
                    Some(schedule) => {
                        let level_matches = if schedule.record_level {
                            services.records.is_record(node)?
                        } else {
                            services.records.is_record_folder(node)?
                        };
                        level_matches && schedule.action_definition(action).is_some()
                    }
                    None => false,
                }
            }
            Self::VitalRecordOrFolder => {
                if services.records.is_record(node)? {
                    services.nodes.has_aspect(node, &ASPECT_VITAL_RECORD)?
                } else if services.records.is_record_folder(node)? {
                    services
                        .nodes
                        .get_property(node, &PROP_VITAL_RECORD_INDICATOR)?
                        .and_then(|value| value.as_bool())
                        .unwrap_or(false)
                } else {
                    false
                }
            }
            Self::Frozen { check_children } => is_frozen(services, node, *check_children)?,
            Self::HasAspect { aspect } => services.nodes.has_aspect(node, aspect)?,
            Self::IsKind { kinds } => services
                .records
                .get_file_plan_component_kind(node)?
                .map_or(false, |kind| kinds.contains(&kind)),
        };

        trace!(condition = self.type_name(), %node, result, "Evaluated condition");
        Ok(result)
    }
}

fn is_allowed(services: &Services, node: &NodeRef, permission: &str) -> Result<bool> {
    Ok(services
        .permissions
        .has_permission(node, permission)?
        .is_allowed())
}

fn any_hold_allowed(services: &Services, node: &NodeRef, included: bool) -> Result<bool> {
    for hold in services.holds.held_by(node, included)? {
        if is_allowed(services, &hold, permissions::FILING)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_closed_folder(services: &Services, node: &NodeRef) -> Result<bool> {
    if !services.records.is_record_folder(node)? {
        return Ok(false);
    }
    Ok(services
        .nodes
        .get_property(node, &PROP_IS_CLOSED)?
        .and_then(|value| value.as_bool())
        .unwrap_or(false))
}

fn is_closed(services: &Services, node: &NodeRef) -> Result<bool> {
    if services.records.is_record(node)? {
        // Any closed folder the record is filed in is enough
        for assoc in services.nodes.get_parent_associations(node)? {
            if is_closed_folder(services, &assoc.parent)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }
    is_closed_folder(services, node)
}

fn is_filling(services: &Services, node: &NodeRef) -> Result<bool> {
    let file_plan = services.records.get_file_plan(node)?;
    if let Some(plan) = &file_plan {
        if is_allowed(services, plan, permissions::ROLE_ADMINISTRATOR)? {
            return Ok(true);
        }
    }

    let kind = services.records.get_file_plan_component_kind(node)?;
    let is_content = match kind {
        Some(FilePlanComponentKind::Record) => true,
        Some(_) => false,
        None => {
            let node_type = services.nodes.get_type(node)?;
            services.dictionary.is_sub_class(&node_type, &TYPE_CONTENT)?
        }
    };

    if is_content {
        for assoc in services.nodes.get_parent_associations(node)? {
            if is_allowed(services, &assoc.parent, permissions::FILING)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }

    match kind {
        Some(FilePlanComponentKind::RecordFolder) => {
            is_allowed(services, node, permissions::FILING)
        }
        Some(FilePlanComponentKind::RecordCategory) => {
            if is_allowed(services, node, permissions::FILING)? {
                return Ok(true);
            }
            match &file_plan {
                Some(plan) => is_allowed(services, plan, permissions::CREATE_MODIFY_DESTROY_FOLDERS),
                None => Ok(false),
            }
        }
        _ => match &file_plan {
            Some(plan) => Ok(is_allowed(services, plan, permissions::FILING)?
                || is_allowed(
                    services,
                    plan,
                    permissions::CREATE_MODIFY_DESTROY_FILEPLAN_METADATA,
                )?),
            None => Ok(false),
        },
    }
}

fn all_children_allowed(services: &Services, node: &NodeRef, permission: &str) -> Result<bool> {
    for assoc in services.nodes.get_child_associations(node)? {
        if !is_allowed(services, &assoc.child, permission)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn has_disposition_date(services: &Services, node: &NodeRef) -> Result<bool> {
    match services.dispositions.get_next_disposition_action(node)? {
        Some(action) => Ok(action.as_of.is_some()),
        None => Ok(services
            .nodes
            .get_property(node, &PROP_DISPOSITION_AS_OF)?
            .map_or(false, |value| !value.is_null())),
    }
}

fn is_frozen(services: &Services, node: &NodeRef, check_children: bool) -> Result<bool> {
    if !services.holds.held_by(node, true)?.is_empty() {
        return Ok(true);
    }
    if check_children {
        for assoc in services.nodes.get_child_associations(node)? {
            if !services.holds.held_by(&assoc.child, true)?.is_empty() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fileplan_core::model::{ASPECT_CUT_OFF, ASSOC_CONTAINS};
    use fileplan_core::repository::InMemoryRepository;
    use fileplan_core::{
        AuthenticationStack, DispositionAction, DispositionActionDefinition, DispositionSchedule,
    };
    use std::sync::Arc;

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        services: Services,
        plan: NodeRef,
        category: NodeRef,
        folder: NodeRef,
        record: NodeRef,
    }

    fn fixture() -> Fixture {
        let identity = Arc::new(AuthenticationStack::authenticated("System", "alice"));
        let repo = Arc::new(InMemoryRepository::new(identity.clone()));
        let services = Services::from_repository(repo.clone(), identity);
        let plan = repo.create_file_plan("plan").unwrap();
        let category = repo.create_record_category(&plan, "category").unwrap();
        let folder = repo.create_record_folder(&category, "folder").unwrap();
        let record = repo.create_record(&folder, "record").unwrap();
        Fixture {
            repo,
            services,
            plan,
            category,
            folder,
            record,
        }
    }

    #[test]
    fn test_closed_when_any_parent_folder_closed() {
        let f = fixture();
        let second = f.repo.create_record_folder(&f.category, "second").unwrap();
        f.repo.link(&second, &f.record, ASSOC_CONTAINS).unwrap();

        assert!(!Condition::Closed.evaluate(&f.services, &f.record).unwrap());

        f.repo.close_folder(&second).unwrap();
        assert!(Condition::Closed.evaluate(&f.services, &f.record).unwrap());
        assert!(Condition::Closed.evaluate(&f.services, &second).unwrap());
        assert!(!Condition::Closed.evaluate(&f.services, &f.folder).unwrap());
        assert!(!Condition::Closed.evaluate(&f.services, &f.category).unwrap());
    }

    #[test]
    fn test_declared_only_for_records() {
        let f = fixture();
        assert!(!Condition::Declared.evaluate(&f.services, &f.record).unwrap());
        f.repo.declare_record(&f.record).unwrap();
        assert!(Condition::Declared.evaluate(&f.services, &f.record).unwrap());
        assert!(!Condition::Declared.evaluate(&f.services, &f.folder).unwrap());
    }

    #[test]
    fn test_filling_by_kind() {
        let f = fixture();
        assert!(!Condition::Filling.evaluate(&f.services, &f.record).unwrap());

        f.repo.grant(&f.folder, "alice", &[permissions::FILING]).unwrap();
        assert!(Condition::Filling.evaluate(&f.services, &f.record).unwrap());
        assert!(Condition::Filling.evaluate(&f.services, &f.folder).unwrap());
        assert!(!Condition::Filling.evaluate(&f.services, &f.category).unwrap());

        f.repo
            .grant(&f.plan, "alice", &[permissions::CREATE_MODIFY_DESTROY_FOLDERS])
            .unwrap();
        assert!(Condition::Filling.evaluate(&f.services, &f.category).unwrap());
        assert!(!Condition::Filling.evaluate(&f.services, &f.plan).unwrap());

        f.repo
            .grant(&f.plan, "alice", &[permissions::ROLE_ADMINISTRATOR])
            .unwrap();
        assert!(Condition::Filling.evaluate(&f.services, &f.plan).unwrap());
    }

    #[test]
    fn test_children_conditions() {
        let f = fixture();
        let empty = f.repo.create_record_folder(&f.category, "empty").unwrap();
        assert!(Condition::FillingOnChildren.evaluate(&f.services, &empty).unwrap());
        assert!(Condition::ReadOnChildren.evaluate(&f.services, &empty).unwrap());

        assert!(!Condition::ReadOnChildren.evaluate(&f.services, &f.folder).unwrap());
        f.repo
            .grant(&f.folder, "alice", &[permissions::READ_RECORDS])
            .unwrap();
        assert!(Condition::ReadOnChildren.evaluate(&f.services, &f.folder).unwrap());

        let second = f.repo.create_record(&f.folder, "second").unwrap();
        f.repo
            .deny(&second, "alice", &[permissions::READ_RECORDS])
            .unwrap();
        assert!(!Condition::ReadOnChildren.evaluate(&f.services, &f.folder).unwrap());
    }

    #[test]
    fn test_disposition_conditions() {
        let f = fixture();
        assert!(!Condition::IsClassified.evaluate(&f.services, &f.folder).unwrap());
        assert!(!Condition::HasDispositionDate.evaluate(&f.services, &f.folder).unwrap());

        f.repo
            .set_disposition_schedule(
                &f.category,
                DispositionSchedule {
                    node: f.category,
                    record_level: false,
                    action_definitions: vec![
                        DispositionActionDefinition {
                            name: "cutoff".to_string(),
                            index: 0,
                        },
                        DispositionActionDefinition {
                            name: "destroy".to_string(),
                            index: 1,
                        },
                    ],
                },
            )
            .unwrap();

        let cutoff = Condition::MayBeScheduled {
            action: "cutoff".to_string(),
        };
        let transfer = Condition::MayBeScheduled {
            action: "transfer".to_string(),
        };
        assert!(Condition::IsClassified.evaluate(&f.services, &f.folder).unwrap());
        assert!(cutoff.evaluate(&f.services, &f.folder).unwrap());
        assert!(!transfer.evaluate(&f.services, &f.folder).unwrap());
        // Folder-level schedule does not schedule records
        assert!(!cutoff.evaluate(&f.services, &f.record).unwrap());
        // Nor components that are neither records nor folders
        assert!(!cutoff.evaluate(&f.services, &f.category).unwrap());

        f.repo
            .set_next_disposition_action(&f.folder, DispositionAction::pending("cutoff", None))
            .unwrap();
        assert!(!Condition::HasDispositionDate.evaluate(&f.services, &f.folder).unwrap());
        f.repo
            .set_next_disposition_action(
                &f.folder,
                DispositionAction::pending("cutoff", Some(Utc::now())),
            )
            .unwrap();
        assert!(Condition::HasDispositionDate.evaluate(&f.services, &f.folder).unwrap());

        let last_cutoff = Condition::LastDispositionAction {
            action: "cutoff".to_string(),
        };
        assert!(!last_cutoff.evaluate(&f.services, &f.folder).unwrap());
        f.repo
            .complete_disposition_action(&f.folder, DispositionAction::completed("cutoff", Utc::now()))
            .unwrap();
        assert!(last_cutoff.evaluate(&f.services, &f.folder).unwrap());

        f.repo
            .set_property(&f.record, PROP_DISPOSITION_AS_OF, Utc::now())
            .unwrap();
        assert!(Condition::HasDispositionDate.evaluate(&f.services, &f.record).unwrap());
    }

    #[test]
    fn test_record_level_schedule_only_schedules_records() {
        let f = fixture();
        f.repo
            .set_disposition_schedule(
                &f.category,
                DispositionSchedule {
                    node: f.category,
                    record_level: true,
                    action_definitions: vec![DispositionActionDefinition {
                        name: "cutoff".to_string(),
                        index: 0,
                    }],
                },
            )
            .unwrap();

        let cutoff = Condition::MayBeScheduled {
            action: "cutoff".to_string(),
        };
        assert!(cutoff.evaluate(&f.services, &f.record).unwrap());
        assert!(!cutoff.evaluate(&f.services, &f.folder).unwrap());
        assert!(!cutoff.evaluate(&f.services, &f.category).unwrap());
    }

    #[test]
    fn test_hold_conditions() {
        let f = fixture();
        let hold = f.repo.create_hold(&f.plan, "hold").unwrap();
        let held = Condition::Hold { included: true };
        let available = Condition::Hold { included: false };
        let frozen = Condition::Frozen {
            check_children: false,
        };

        assert!(!held.evaluate(&f.services, &f.record).unwrap());
        assert!(!available.evaluate(&f.services, &f.record).unwrap());

        f.repo.grant(&hold, "alice", &[permissions::FILING]).unwrap();
        assert!(available.evaluate(&f.services, &f.record).unwrap());

        f.repo.add_to_hold(&hold, &f.record).unwrap();
        assert!(held.evaluate(&f.services, &f.record).unwrap());
        assert!(!available.evaluate(&f.services, &f.record).unwrap());
        assert!(frozen.evaluate(&f.services, &f.record).unwrap());
        assert!(!frozen.evaluate(&f.services, &f.folder).unwrap());

        let frozen_children = Condition::Frozen {
            check_children: true,
        };
        assert!(frozen_children.evaluate(&f.services, &f.folder).unwrap());
    }

    #[test]
    fn test_vital_record_or_folder() {
        let f = fixture();
        assert!(!Condition::VitalRecordOrFolder.evaluate(&f.services, &f.record).unwrap());
        f.repo.add_aspect(&f.record, ASPECT_VITAL_RECORD).unwrap();
        assert!(Condition::VitalRecordOrFolder.evaluate(&f.services, &f.record).unwrap());

        assert!(!Condition::VitalRecordOrFolder.evaluate(&f.services, &f.folder).unwrap());
        f.repo
            .set_property(&f.folder, PROP_VITAL_RECORD_INDICATOR, true)
            .unwrap();
        assert!(Condition::VitalRecordOrFolder.evaluate(&f.services, &f.folder).unwrap());
    }

    #[test]
    fn test_aspect_and_kind_conditions() {
        let f = fixture();
        let cutoff = Condition::HasAspect {
            aspect: ASPECT_CUT_OFF,
        };
        assert!(!cutoff.evaluate(&f.services, &f.folder).unwrap());
        f.repo.add_aspect(&f.folder, ASPECT_CUT_OFF).unwrap();
        assert!(cutoff.evaluate(&f.services, &f.folder).unwrap());

        let is_container = Condition::IsKind {
            kinds: [FilePlanComponentKind::RecordCategory, FilePlanComponentKind::FilePlan]
                .into_iter()
                .collect(),
        };
        assert!(is_container.evaluate(&f.services, &f.category).unwrap());
        assert!(!is_container.evaluate(&f.services, &f.record).unwrap());
    }

    #[test]
    fn test_conditions_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            condition: Vec<Condition>,
        }

        let doc: Doc = toml::from_str(
            r#"
            [[condition]]
            type = "closed"

            [[condition]]
            type = "hold"
            included = false

            [[condition]]
            type = "has_aspect"
            aspect = "rma:cutOff"
            "#,
        )
        .unwrap();

        assert_eq!(
            doc.condition,
            vec![
                Condition::Closed,
                Condition::Hold { included: false },
                Condition::HasAspect {
                    aspect: ASPECT_CUT_OFF
                },
            ]
        );
    }
}
