//! Common test utilities for edge-service integration tests.

#![allow(dead_code)]

use chrono::Utc;
use edge_service::config::{DatabaseConfig, EdgeConfig};
use edge_service::models::{ExitNode, Resource, Site, Target};
use edge_service::services::Database;
use edge_service::startup::Application;
use service_core::config::Config as CommonConfig;
use std::net::Ipv4Addr;
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,edge_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn exit_node(exit_node_id: i64) -> ExitNode {
    ExitNode {
        exit_node_id,
        name: format!("exit-{}", exit_node_id),
        address: "100.89.128.1/24".to_string(),
        private_key: format!("exit-{}-private", exit_node_id),
        listen_port: 51820,
    }
}

pub fn site(site_id: i64, org_id: i64, exit_node_id: Option<i64>) -> Site {
    Site {
        site_id,
        org_id,
        exit_node_id,
        name: format!("site-{}", site_id),
        subdomain: None,
        pub_key: format!("site-{}-pub", site_id),
        subnet: Some("100.89.137.0/24".to_string()),
        created_utc: Utc::now(),
    }
}

pub fn resource(site_id: i64, org_id: i64) -> Resource {
    Resource {
        resource_id: Uuid::new_v4(),
        site_id,
        org_id,
        name: "dashboard".to_string(),
        subdomain: Some("dash".to_string()),
        created_utc: Utc::now(),
    }
}

pub fn target(target_id: i64, resource_id: Uuid, ip: &str) -> Target {
    Target {
        target_id,
        resource_id,
        ip: ip.to_string(),
        method: Some("http".to_string()),
        port: Some(8080),
        protocol: Some("tcp".to_string()),
    }
}

fn test_database_url() -> String {
    std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set for database tests")
}

/// Connect to the test database with migrations applied.
pub async fn test_database() -> Database {
    init_tracing();

    let db = Database::new(&test_database_url(), 2, 1)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    db
}

fn test_config() -> EdgeConfig {
    EdgeConfig {
        common: CommonConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
        },
        service_name: "edge-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: test_database_url(),
            max_connections: 2,
            min_connections: 1,
        },
    }
}

/// Build the service against the test database without serving it.
pub async fn build_app() -> Application {
    init_tracing();

    Application::build(test_config())
        .await
        .expect("Failed to build application")
}

/// Spawn the service in the background and return its HTTP base URL.
pub async fn spawn_app() -> String {
    let app = build_app().await;
    let port = app.port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}
