//! PostgreSQL store tests.
//!
//! Require TEST_DATABASE_URL; run with `cargo test -- --ignored`.

mod common;

use edge_service::models::{Action, CreateResource, CreateSite, RequestContext};
use edge_service::services::{
    Database, PeerConfigService, PermissionService, PermissionStore, ServiceError, TopologyWriter,
};
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

async fn seed_org(db: &Database) -> (i64, i64) {
    let org_id: i64 = sqlx::query_scalar(
        "INSERT INTO orgs (name, domain) VALUES ('Test Org', 'test.example') RETURNING org_id",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    let role_id: i64 = sqlx::query_scalar(
        "INSERT INTO roles (org_id, name) VALUES ($1, 'Member') RETURNING role_id",
    )
    .bind(org_id)
    .fetch_one(db.pool())
    .await
    .unwrap();
    (org_id, role_id)
}

async fn seed_member(db: &Database, org_id: i64, role_id: i64) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (user_id, email) VALUES ($1, $2)")
        .bind(user_id)
        .bind(format!("{}@test.example", user_id))
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO user_orgs (user_id, org_id, role_id) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(org_id)
        .bind(role_id)
        .execute(db.pool())
        .await
        .unwrap();
    user_id
}

#[tokio::test]
#[ignore]
#[serial]
async fn role_grant_is_scoped_to_org() {
    let db = Arc::new(common::test_database().await);
    let (org_a, role) = seed_org(&db).await;
    let (org_b, _) = seed_org(&db).await;
    let user = seed_member(&db, org_a, role).await;
    sqlx::query("INSERT INTO role_actions (role_id, action_id, org_id) VALUES ($1, $2, $3)")
        .bind(role)
        .bind(Action::ListSites.as_str())
        .bind(org_a)
        .execute(db.pool())
        .await
        .unwrap();

    let permissions = PermissionService::new(db.clone());

    assert!(permissions
        .is_action_permitted(Action::ListSites, &RequestContext::new(user, org_a))
        .await
        .unwrap());
    assert!(!db.has_role_action(role, Action::ListSites, org_b).await.unwrap());
    assert_eq!(db.find_membership_role(user, org_b).await.unwrap(), None);
}

#[tokio::test]
#[ignore]
#[serial]
async fn peer_config_reads_stored_topology() {
    let db = Arc::new(common::test_database().await);
    let (org_id, _) = seed_org(&db).await;
    let exit_node_id: i64 = sqlx::query_scalar(
        "INSERT INTO exit_nodes (name, address, private_key, listen_port)
         VALUES ('exit', '100.89.128.1/24', 'exit-private', 51820)
         RETURNING exit_node_id",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();

    let site = db
        .insert_site(
            org_id,
            &CreateSite {
                name: "office".to_string(),
                subdomain: None,
                pub_key: "office-pub".to_string(),
                subnet: None,
                exit_node_id: Some(exit_node_id),
            },
        )
        .await
        .unwrap();
    let resource = db
        .insert_resource(
            Uuid::new_v4(),
            org_id,
            site.site_id,
            &CreateResource {
                name: "wiki".to_string(),
                subdomain: None,
            },
        )
        .await
        .unwrap();
    sqlx::query("INSERT INTO targets (resource_id, ip) VALUES ($1, '10.1.0.9')")
        .bind(resource.resource_id)
        .execute(db.pool())
        .await
        .unwrap();

    let config = PeerConfigService::new(db.clone())
        .build_exit_node_config(exit_node_id)
        .await
        .unwrap();

    assert_eq!(config.private_key, "exit-private");
    assert_eq!(config.peers.len(), 1);
    assert_eq!(config.peers[0].public_key, "office-pub");
    assert_eq!(config.peers[0].allowed_ips, vec!["10.1.0.9/32"]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn health_endpoint_reports_ok() {
    let base_url = common::spawn_app().await;

    let response = reqwest::get(format!("{}/health", base_url)).await.unwrap();

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore]
#[serial]
async fn application_state_serves_domain_services() {
    let app = common::build_app().await;
    let state = app.state();
    let stranger = RequestContext::new(Uuid::new_v4(), i64::MAX);

    let decision = state
        .permissions
        .is_action_permitted(Action::GetSite, &stranger)
        .await;
    assert!(matches!(decision, Err(ServiceError::Forbidden(_))));

    let missing = state.peer_config.build_exit_node_config(i64::MAX).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let denied = state.topology.get_resource(&stranger, Uuid::new_v4()).await;
    assert!(matches!(denied, Err(ServiceError::Forbidden(_))));
}
