// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use permission_engine::test_utils::{catalog, seeded_store, setup_logging};
use permission_engine::{
    Actor, ActorId, ActorStore, EngineConfig, Group, GroupId, GroupStore, MatchMode, MemoryStore,
    NodeCatalog, NodeName, Operation, PermissionChecker, PermissionService, PermissionString,
    PolicyEvaluator, resolve,
};
use rstest::rstest;

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[rstest]
#[tokio::test]
async fn deny_override_beats_group_grant(
    catalog: NodeCatalog,
    #[future] seeded_store: MemoryStore,
) {
    let mut service = PermissionService::new(Arc::new(catalog), seeded_store.await);
    assert!(
        service
            .has_permission(ActorId(1), "survey.read")
            .await
            .unwrap()
    );

    service
        .update_overrides(ActorId(1), &strings(&["-survey.read"]))
        .await
        .unwrap();
    assert!(
        !service
            .has_permission(ActorId(1), "survey.read")
            .await
            .unwrap()
    );
    assert_eq!(
        service.effective_permissions(ActorId(1)).await.unwrap(),
        ["-survey.read"]
    );
}

#[rstest]
#[tokio::test]
async fn additive_override_without_group_grant(catalog: NodeCatalog) {
    let mut store = MemoryStore::new();
    store.create_group("Empty", &[]).await.unwrap();
    store
        .save_actor(Actor::new(ActorId(1), "Empty"))
        .await
        .unwrap();
    let mut service = PermissionService::new(Arc::new(catalog), store);

    service
        .update_overrides(ActorId(1), &strings(&["+user.create"]))
        .await
        .unwrap();
    assert!(
        service
            .has_permission(ActorId(1), "user.create")
            .await
            .unwrap()
    );
    assert!(
        service
            .authorize(Operation::Create, ActorId(1), None)
            .await
            .unwrap()
    );
}

#[rstest]
#[tokio::test]
async fn unknown_group_is_safe(catalog: NodeCatalog, #[future] seeded_store: MemoryStore) {
    let service = PermissionService::new(Arc::new(catalog), seeded_store.await);
    assert_eq!(
        service.group_permissions("no-such-group").await.unwrap(),
        Vec::<String>::new()
    );
}

#[rstest]
#[case(Operation::Create)]
#[case(Operation::View)]
#[case(Operation::Edit)]
#[case(Operation::Delete)]
#[case(Operation::List)]
#[tokio::test]
async fn admin_bypass(
    #[case] operation: Operation,
    catalog: NodeCatalog,
    #[future] seeded_store: MemoryStore,
) {
    let mut service = PermissionService::new(Arc::new(catalog), seeded_store.await);
    assert!(
        !service
            .authorize(Operation::List, ActorId(1), None)
            .await
            .unwrap()
    );

    service
        .update_overrides(ActorId(1), &strings(&["+user.admin"]))
        .await
        .unwrap();
    assert!(
        service
            .authorize(operation, ActorId(1), Some(ActorId(2)))
            .await
            .unwrap()
    );
}

#[test]
fn self_and_owner_fallback() {
    let checker = PermissionChecker::default();
    let actor = Actor::new(ActorId(1), "Student");
    let effective = resolve(None, &actor);
    let policy = PolicyEvaluator::for_actor(&actor, checker);

    assert!(policy.view(&actor, &effective, &actor));
    assert!(policy.edit(&actor, &effective, &actor));
    assert!(policy.delete(&actor, &effective, &actor));

    let child = Actor::new(ActorId(2), "Student").with_owner(ActorId(1));
    assert!(policy.edit(&actor, &effective, &child));

    let stranger = Actor::new(ActorId(3), "Student");
    assert!(!policy.view(&actor, &effective, &stranger));
    assert!(!policy.edit(&actor, &effective, &stranger));
    assert!(!policy.delete(&actor, &effective, &stranger));
}

#[test]
fn student_scenario() {
    let checker = PermissionChecker::default();
    let group = Group::new(GroupId(1), "Student", ["survey.read"]);
    let actor = Actor::new(ActorId(1), "Student");
    let other = Actor::new(ActorId(2), "Student");
    let effective = resolve(Some(&group), &actor);

    // The user node only allows viewing oneself
    let users = PolicyEvaluator::for_actor(&actor, checker);
    assert!(users.view(&actor, &effective, &actor));
    assert!(!users.view(&actor, &effective, &other));

    // The survey node is decided by the group's "survey.read" grant
    let surveys = PolicyEvaluator::new(NodeName::new("survey").unwrap(), checker);
    assert!(surveys.view(&actor, &effective, &other));
}

#[test]
fn resolving_is_idempotent() {
    let group = Group::new(GroupId(1), "Student", ["survey.read", "news.read"]);
    let actor = Actor::new(ActorId(1), "Student").with_overrides(["-news.read", "+user.list"]);

    let first = resolve(Some(&group), &actor);
    let second = resolve(Some(&group), &actor);
    assert_eq!(first, second);
}

#[rstest]
#[case("survey.read")]
#[case("+user.create")]
#[case("-sos_message.delete")]
fn permission_round_trip(#[case] text: &str) {
    assert_eq!(PermissionString::parse(text).unwrap().signed_form(), text);
}

#[rstest]
#[tokio::test]
async fn configured_engine(#[future] seeded_store: MemoryStore) {
    setup_logging();

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/engine.toml");
    let mut config = EngineConfig::from_path(path).unwrap();
    config.match_mode = MatchMode::Exact;
    let service = PermissionService::from_config(&config, seeded_store.await).unwrap();

    assert!(service.nodes().contains_key("survey"));
    assert!(
        service
            .has_permission(ActorId(2), "survey.update")
            .await
            .unwrap()
    );
    // Exact matching no longer accepts bare actions
    assert!(!service.has_permission(ActorId(2), "update").await.unwrap());
}
