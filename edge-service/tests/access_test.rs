//! Tests for organization-scoped action permission checks.

mod common;

use edge_service::models::{Action, RequestContext};
use edge_service::services::{MockStore, PermissionService, ServiceError};
use std::sync::Arc;
use uuid::Uuid;

const ORG_A: i64 = 100;
const ORG_B: i64 = 200;
const VIEWER: i64 = 1;
const ADMIN: i64 = 2;

fn service() -> (Arc<MockStore>, PermissionService) {
    common::init_tracing();
    let store = Arc::new(MockStore::new());
    (store.clone(), PermissionService::new(store))
}

#[tokio::test]
async fn direct_grant_allows_without_role_grant() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, VIEWER);
    store.grant_user_action(user, Action::CreateSite, ORG_A);

    let allowed = permissions
        .is_action_permitted(Action::CreateSite, &RequestContext::new(user, ORG_A))
        .await
        .unwrap();

    assert!(allowed);
    assert_eq!(
        store.calls(),
        vec!["find_membership_role", "has_user_action"]
    );
}

#[tokio::test]
async fn role_grant_allows_when_no_direct_grant() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, ADMIN);
    store.grant_role_action(ADMIN, Action::UpdateSite, ORG_A);

    let allowed = permissions
        .is_action_permitted(Action::UpdateSite, &RequestContext::new(user, ORG_A))
        .await
        .unwrap();

    assert!(allowed);
    assert_eq!(store.call_count("has_role_action"), 1);
}

#[tokio::test]
async fn no_grant_denies() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, VIEWER);
    store.grant_role_action(VIEWER, Action::GetSite, ORG_A);

    let allowed = permissions
        .is_action_permitted(Action::DeleteSite, &RequestContext::new(user, ORG_A))
        .await
        .unwrap();

    assert!(!allowed);
}

#[tokio::test]
async fn grants_do_not_cross_organizations() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, ADMIN);
    store.add_membership(user, ORG_B, ADMIN);
    store.grant_user_action(user, Action::DeleteResource, ORG_A);
    store.grant_role_action(ADMIN, Action::ListResources, ORG_A);

    let in_b = RequestContext::new(user, ORG_B);
    let direct = permissions
        .is_action_permitted(Action::DeleteResource, &in_b)
        .await
        .unwrap();
    let by_role = permissions
        .is_action_permitted(Action::ListResources, &in_b)
        .await
        .unwrap();

    assert!(!direct);
    assert!(!by_role);
}

#[tokio::test]
async fn non_member_is_forbidden_before_grant_lookups() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, ADMIN);
    store.grant_user_action(user, Action::GetOrg, ORG_B);

    let result = permissions
        .is_action_permitted(Action::GetOrg, &RequestContext::new(user, ORG_B))
        .await;

    match result {
        Err(ServiceError::Forbidden(msg)) => {
            assert_eq!(msg, "User does not have access to this organization")
        }
        other => panic!("expected forbidden, got {:?}", other),
    }
    assert_eq!(store.call_count("has_user_action"), 0);
    assert_eq!(store.call_count("has_role_action"), 0);
}

#[tokio::test]
async fn repeated_checks_return_same_decision() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, VIEWER);
    store.grant_role_action(VIEWER, Action::ListSites, ORG_A);
    let ctx = RequestContext::new(user, ORG_A);

    let first = permissions
        .is_action_permitted(Action::ListSites, &ctx)
        .await
        .unwrap();
    let second = permissions
        .is_action_permitted(Action::ListSites, &ctx)
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn revocation_is_visible_on_next_check() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, VIEWER);
    store.grant_user_action(user, Action::CreateTarget, ORG_A);
    let ctx = RequestContext::new(user, ORG_A);

    assert!(permissions
        .is_action_permitted(Action::CreateTarget, &ctx)
        .await
        .unwrap());

    store.revoke_user_action(user, Action::CreateTarget, ORG_A);

    assert!(!permissions
        .is_action_permitted(Action::CreateTarget, &ctx)
        .await
        .unwrap());
}

#[tokio::test]
async fn removed_membership_is_visible_on_next_check() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, VIEWER);
    store.grant_role_action(VIEWER, Action::GetUser, ORG_A);
    let ctx = RequestContext::new(user, ORG_A);

    assert!(permissions
        .is_action_permitted(Action::GetUser, &ctx)
        .await
        .unwrap());

    store.remove_membership(user, ORG_A);

    let result = permissions.is_action_permitted(Action::GetUser, &ctx).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn grant_lookup_failure_is_internal_not_deny() {
    let (store, permissions) = service();
    let user = Uuid::new_v4();
    store.add_membership(user, ORG_A, VIEWER);
    store.fail_operation("has_role_action");

    let result = permissions
        .is_action_permitted(Action::ListUsers, &RequestContext::new(user, ORG_A))
        .await;

    assert!(matches!(result, Err(ServiceError::Internal(_))));
}

#[tokio::test]
async fn missing_context_fails_before_any_query() {
    let (store, permissions) = service();

    let anonymous = RequestContext::default();
    let no_org = RequestContext {
        user_id: Some(Uuid::new_v4()),
        ..RequestContext::default()
    };

    assert!(matches!(
        permissions
            .is_action_permitted(Action::ListOrgs, &anonymous)
            .await,
        Err(ServiceError::Unauthenticated)
    ));
    match permissions.is_action_permitted(Action::ListOrgs, &no_org).await {
        Err(ServiceError::BadRequest(msg)) => assert_eq!(msg, "Organization ID is required"),
        other => panic!("expected bad request, got {:?}", other),
    }
    assert!(store.calls().is_empty());
}
