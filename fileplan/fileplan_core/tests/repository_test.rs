use std::sync::Arc;

use fileplan_core::model::{permissions, PROP_CREATOR, PROP_OWNER};
use fileplan_core::repository::InMemoryRepository;
use fileplan_core::{
    run_as, run_as_system, AccessStatus, AuthenticationStack, IdentityContext, NodeLookup,
    PermissionLookup, Services,
};

fn fixture() -> (Arc<AuthenticationStack>, Arc<InMemoryRepository>, Services) {
    let identity = Arc::new(AuthenticationStack::authenticated("System", "alice"));
    let repository = Arc::new(InMemoryRepository::new(identity.clone()));
    let services = Services::from_repository(repository.clone(), identity.clone());
    (identity, repository, services)
}

#[test]
fn test_services_share_one_identity() {
    let (identity, repository, services) = fixture();
    let plan = repository.create_file_plan("plan").unwrap();
    repository
        .grant(&plan, "bob", &[permissions::FILING])
        .unwrap();

    assert_eq!(
        services.permissions.has_permission(&plan, permissions::FILING).unwrap(),
        AccessStatus::Denied
    );

    let as_bob = run_as(identity.as_ref(), "bob", || {
        services.permissions.has_permission(&plan, permissions::FILING)
    })
    .unwrap();
    assert_eq!(as_bob, AccessStatus::Allowed);
    assert_eq!(services.identity.current_user().as_deref(), Some("alice"));
}

#[test]
fn test_owner_falls_back_to_creator() {
    let (identity, repository, services) = fixture();
    let plan = repository.create_file_plan("plan").unwrap();
    let category = repository.create_record_category(&plan, "category").unwrap();
    let folder = repository.create_record_folder(&category, "folder").unwrap();
    let record = repository.create_record(&folder, "record").unwrap();

    assert_eq!(services.nodes.get_owner(&record).unwrap(), None);

    repository.set_property(&record, PROP_CREATOR, "carol").unwrap();
    assert_eq!(
        services.nodes.get_owner(&record).unwrap().as_deref(),
        Some("carol")
    );

    repository.set_property(&record, PROP_OWNER, "alice").unwrap();
    let owner = run_as_system(identity.as_ref(), || services.nodes.get_owner(&record)).unwrap();
    assert_eq!(owner.as_deref(), Some("alice"));
}

#[test]
fn test_unauthenticated_principal_is_denied() {
    let identity = Arc::new(AuthenticationStack::new("System"));
    let repository = InMemoryRepository::new(identity);
    let plan = repository.create_file_plan("plan").unwrap();

    assert_eq!(
        repository.has_permission(&plan, permissions::READ).unwrap(),
        AccessStatus::Denied
    );
    assert!(repository.exists(&plan).unwrap());
}
