//! Integration tests for the after-invocation result filter.
//!
//! The manager may read the `open` folder and everything filed in it, plus
//! the `lone` record on its own; the rest of the file plan is hidden.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use fileplan_capability::AccessDecision;
use fileplan_core::error::PolicyError;
use fileplan_core::model::{permissions, ASSOC_CONTAINS};
use fileplan_core::repository::InMemoryRepository;
use fileplan_core::{
    run_as_system, AfterInvocationConfig, AuthenticationStack, ChildAssociation, EngineConfig,
    Error, NodeRef, PropertyValue, Services,
};
use fileplan_policy::{EntryVoter, Invocation, ResultFilter, Returned};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const MANAGER: &str = "manager";
const FILTER: &str = "AFTER_RM.FilterNode";
const FILTER_PARENT: &str = "AFTER_RM.FilterNode.parent";

// Initialize tracing for tests
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

struct Fixture {
    identity: Arc<AuthenticationStack>,
    voter: EntryVoter,
    filter: ResultFilter,
    open: NodeRef,
    visible: NodeRef,
    folder: NodeRef,
    hidden: NodeRef,
    lone: NodeRef,
    content: NodeRef,
}

fn fixture_with(config: &EngineConfig) -> Fixture {
    init_tracing();
    let identity = Arc::new(AuthenticationStack::authenticated("System", MANAGER));
    let repo = Arc::new(InMemoryRepository::new(identity.clone()));
    let services = Services::from_repository(repo.clone(), identity.clone());
    let voter = EntryVoter::from_config(services, config).unwrap();
    let filter = ResultFilter::from_config(voter.service().clone(), config);

    let plan = repo.create_file_plan("plan").unwrap();
    let category = repo.create_record_category(&plan, "category").unwrap();
    let open = repo.create_record_folder(&category, "open").unwrap();
    let visible = repo.create_record(&open, "visible").unwrap();
    let folder = repo.create_record_folder(&category, "folder").unwrap();
    let hidden = repo.create_record(&folder, "hidden").unwrap();
    let lone = repo.create_record(&folder, "lone").unwrap();
    let content = repo.create_content(None, "content").unwrap();

    repo.grant(&open, MANAGER, &[permissions::VIEW_RECORDS]).unwrap();
    repo.grant(&lone, MANAGER, &[permissions::VIEW_RECORDS]).unwrap();
    Fixture {
        identity,
        voter,
        filter,
        open,
        visible,
        folder,
        hidden,
        lone,
        content,
    }
}

fn fixture() -> Fixture {
    fixture_with(&EngineConfig::default())
}

fn contains(parent: NodeRef, child: NodeRef) -> ChildAssociation {
    ChildAssociation {
        parent,
        child,
        assoc_type: ASSOC_CONTAINS,
        is_primary: true,
    }
}

fn is_denied(result: Result<fileplan_policy::Filtered, Error>) -> bool {
    matches!(result, Err(Error::Policy(PolicyError::AccessDenied(_))))
}

#[test]
fn test_values_pass_without_filter_directives() {
    let f = fixture();
    let returned = Returned::from(vec![f.visible, f.hidden]);

    let filtered = f.filter.filter(returned.clone(), &["RM_QUERY"]).unwrap();
    assert_eq!(filtered.value, returned);
    assert!(!filtered.cut_off);

    let none: [&str; 0] = [];
    let filtered = f.filter.filter(Returned::Node(f.hidden), &none).unwrap();
    assert_eq!(filtered.value, Returned::Node(f.hidden));
}

#[test]
fn test_system_user_sees_everything() {
    let f = fixture();
    let returned = Returned::from(vec![f.visible, f.hidden]);

    let filtered = run_as_system(f.identity.as_ref(), || f.filter.filter(returned.clone(), &[FILTER]))
        .unwrap();
    assert_eq!(filtered.value, returned);
}

#[test]
fn test_single_node() {
    let f = fixture();

    assert!(f.filter.filter(Returned::Node(f.visible), &[FILTER]).is_ok());
    assert!(is_denied(f.filter.filter(Returned::Node(f.hidden), &[FILTER])));
    // Nodes outside the file plan are not filtered
    assert!(f.filter.filter(Returned::Node(f.content), &[FILTER]).is_ok());
    assert_eq!(
        f.filter.filter(Returned::Null, &[FILTER]).unwrap().value,
        Returned::Null
    );
}

#[test]
fn test_single_node_tested_on_parent() {
    let f = fixture();

    assert!(f.filter.filter(Returned::Node(f.lone), &[FILTER]).is_ok());
    assert!(is_denied(f.filter.filter(Returned::Node(f.lone), &[FILTER_PARENT])));
    assert!(f.filter.filter(Returned::Node(f.visible), &[FILTER_PARENT]).is_ok());
}

#[test]
fn test_single_associations() {
    let f = fixture();

    let readable = Returned::ChildAssociation(contains(f.open, f.visible));
    assert!(f.filter.filter(readable, &[FILTER, FILTER_PARENT]).is_ok());

    let hidden_child = Returned::ChildAssociation(contains(f.open, f.hidden));
    assert!(is_denied(f.filter.filter(hidden_child.clone(), &[FILTER])));
    assert!(f.filter.filter(hidden_child, &[FILTER_PARENT]).is_ok());

    let peer = Returned::Association {
        source: f.folder,
        target: f.visible,
    };
    assert!(f.filter.filter(peer.clone(), &[FILTER]).is_ok());
    assert!(is_denied(f.filter.filter(peer, &[FILTER_PARENT])));
}

#[test]
fn test_list_drops_unreadable_entries() {
    let f = fixture();
    let missing = NodeRef::new();
    let returned = Returned::List(vec![
        Returned::Node(f.visible),
        Returned::Node(f.hidden),
        Returned::Node(f.content),
        Returned::Node(missing),
        Returned::Node(f.lone),
    ]);

    let filtered = f.filter.filter(returned, &[FILTER]).unwrap();
    assert_eq!(
        filtered.value,
        Returned::from(vec![f.visible, f.content, f.lone])
    );
    assert!(!filtered.cut_off);
    assert_eq!(filtered.checks_remaining, 0);
}

#[test]
fn test_list_tested_on_parents() {
    let f = fixture();

    let nodes = Returned::from(vec![f.visible, f.lone]);
    let filtered = f.filter.filter(nodes, &[FILTER_PARENT]).unwrap();
    assert_eq!(filtered.value, Returned::from(vec![f.visible]));

    let children = Returned::from(vec![contains(f.open, f.visible), contains(f.folder, f.lone)]);
    let filtered = f.filter.filter(children.clone(), &[FILTER]).unwrap();
    assert_eq!(filtered.value, children);
    let filtered = f.filter.filter(children, &[FILTER_PARENT]).unwrap();
    assert_eq!(
        filtered.value,
        Returned::from(vec![contains(f.open, f.visible)])
    );
}

#[test]
fn test_other_modes_do_not_filter_lists() {
    let f = fixture();
    let returned = Returned::List(vec![
        Returned::Node(f.hidden),
        Returned::Value(PropertyValue::Text("note".to_string())),
    ]);

    let filtered = f.filter.filter(returned.clone(), &["AFTER_RM.Read"]).unwrap();
    assert_eq!(filtered.value, returned);

    assert!(matches!(
        f.filter.filter(returned, &[FILTER]),
        Err(Error::Policy(PolicyError::UnsupportedReturn(kind))) if kind == "value"
    ));
}

#[test]
fn test_map_of_result_sets() {
    let f = fixture();
    let mut sets = BTreeMap::new();
    sets.insert("workspace".to_string(), Returned::from(vec![f.visible, f.hidden]));
    sets.insert("archive".to_string(), Returned::from(vec![f.hidden]));

    let filtered = f.filter.filter(Returned::Map(sets), &[FILTER]).unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("workspace".to_string(), Returned::from(vec![f.visible]));
    expected.insert("archive".to_string(), Returned::List(Vec::new()));
    assert_eq!(filtered.value, Returned::Map(expected));
}

#[test]
fn test_check_count_cuts_off() {
    let config = EngineConfig {
        after_invocation: AfterInvocationConfig {
            max_permission_checks: Some(2),
            max_permission_check_time_ms: None,
        },
        ..EngineConfig::default()
    };
    let f = fixture_with(&config);
    let returned = Returned::from(vec![f.visible, f.hidden, f.lone, f.visible]);

    let filtered = f.filter.filter(returned, &[FILTER]).unwrap();
    assert_eq!(filtered.value, Returned::from(vec![f.visible]));
    assert!(filtered.cut_off);
    assert_eq!(filtered.checks_remaining, 2);
}

#[test]
fn test_check_time_cuts_off() {
    let f = fixture();
    let filter = f.filter.clone().with_max_check_time(Some(Duration::ZERO));
    let returned = Returned::from(vec![f.visible, f.lone, f.visible, f.lone]);

    let filtered = filter.filter(returned, &[FILTER]).unwrap();
    assert!(filtered.cut_off);
    assert!(filtered.checks_remaining >= 3);
    assert!(filtered.value.as_list().unwrap().len() <= 1);
}

#[test]
fn test_query_then_filter() {
    let f = fixture();
    let directives = ["RM_QUERY", FILTER];
    let invocation = Invocation::new("getChildAssocs").arg(f.folder);

    let vote = f.voter.vote(&invocation, &directives).unwrap();
    assert_eq!(vote.decision, AccessDecision::Granted);

    let children = Returned::from(vec![contains(f.folder, f.hidden), contains(f.folder, f.lone)]);
    let filtered = f.filter.filter(children, &directives).unwrap();
    assert_eq!(
        filtered.value,
        Returned::from(vec![contains(f.folder, f.lone)])
    );
}
