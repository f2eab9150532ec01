//! Database service for edge-service.

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use super::store::{PermissionStore, TopologyStore, TopologyWriter};
use crate::models::{
    Action, CreateResource, CreateSite, ExitNode, Resource, Site, Target, UpdateResource,
    UserOrgMembership,
};
use crate::services::metrics::DB_QUERY_DURATION;

const SITE_COLUMNS: &str =
    "site_id, org_id, exit_node_id, name, subdomain, pub_key, subnet, created_utc";
const RESOURCE_COLUMNS: &str = "resource_id, site_id, org_id, name, subdomain, created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "edge-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

// -------------------------------------------------------------------------
// Permission lookups
// -------------------------------------------------------------------------

#[async_trait]
impl PermissionStore for Database {
    #[instrument(skip(self), fields(user_id = %user_id, org_id = org_id))]
    async fn find_membership_role(
        &self,
        user_id: Uuid,
        org_id: i64,
    ) -> Result<Option<i64>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_membership_role"])
            .start_timer();

        let membership = sqlx::query_as::<_, UserOrgMembership>(
            r#"
            SELECT user_id, org_id, role_id, created_utc
            FROM user_orgs
            WHERE user_id = $1 AND org_id = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to find membership: {}", e))?;

        timer.observe_duration();

        Ok(membership.map(|m| m.role_id))
    }

    #[instrument(skip(self), fields(user_id = %user_id, action = %action, org_id = org_id))]
    async fn has_user_action(
        &self,
        user_id: Uuid,
        action: Action,
        org_id: i64,
    ) -> Result<bool, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["has_user_action"])
            .start_timer();

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_actions
                WHERE user_id = $1 AND action_id = $2 AND org_id = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(action.as_str())
        .bind(org_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to check user action: {}", e))?;

        timer.observe_duration();

        Ok(exists)
    }

    #[instrument(skip(self), fields(role_id = role_id, action = %action, org_id = org_id))]
    async fn has_role_action(
        &self,
        role_id: i64,
        action: Action,
        org_id: i64,
    ) -> Result<bool, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["has_role_action"])
            .start_timer();

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM role_actions
                WHERE role_id = $1 AND action_id = $2 AND org_id = $3
            )
            "#,
        )
        .bind(role_id)
        .bind(action.as_str())
        .bind(org_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to check role action: {}", e))?;

        timer.observe_duration();

        Ok(exists)
    }
}

// -------------------------------------------------------------------------
// Topology reads
// -------------------------------------------------------------------------

#[async_trait]
impl TopologyStore for Database {
    #[instrument(skip(self), fields(exit_node_id = exit_node_id))]
    async fn find_exit_node(&self, exit_node_id: i64) -> Result<Option<ExitNode>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_exit_node"])
            .start_timer();

        let exit_node = sqlx::query_as::<_, ExitNode>(
            r#"
            SELECT exit_node_id, name, address, private_key, listen_port
            FROM exit_nodes
            WHERE exit_node_id = $1
            "#,
        )
        .bind(exit_node_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get exit node: {}", e))?;

        timer.observe_duration();

        Ok(exit_node)
    }

    #[instrument(skip(self), fields(exit_node_id = exit_node_id))]
    async fn list_sites_for_exit_node(
        &self,
        exit_node_id: i64,
    ) -> Result<Vec<Site>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_sites_for_exit_node"])
            .start_timer();

        let sites = sqlx::query_as::<_, Site>(&format!(
            "SELECT {} FROM sites WHERE exit_node_id = $1",
            SITE_COLUMNS
        ))
        .bind(exit_node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list sites: {}", e))?;

        timer.observe_duration();

        Ok(sites)
    }

    #[instrument(skip(self), fields(site_id = site_id))]
    async fn list_resources_for_site(&self, site_id: i64) -> Result<Vec<Resource>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_resources_for_site"])
            .start_timer();

        let resources = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {} FROM resources WHERE site_id = $1",
            RESOURCE_COLUMNS
        ))
        .bind(site_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list resources: {}", e))?;

        timer.observe_duration();

        Ok(resources)
    }

    #[instrument(skip(self), fields(resource_id = %resource_id))]
    async fn list_targets_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<Target>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_targets_for_resource"])
            .start_timer();

        let targets = sqlx::query_as::<_, Target>(
            r#"
            SELECT target_id, resource_id, ip, method, port, protocol
            FROM targets
            WHERE resource_id = $1
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list targets: {}", e))?;

        timer.observe_duration();

        Ok(targets)
    }
}

// -------------------------------------------------------------------------
// Topology writes
// -------------------------------------------------------------------------

#[async_trait]
impl TopologyWriter for Database {
    #[instrument(skip(self, input), fields(org_id = org_id, name = %input.name))]
    async fn insert_site(&self, org_id: i64, input: &CreateSite) -> Result<Site, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_site"])
            .start_timer();

        let site = sqlx::query_as::<_, Site>(&format!(
            r#"
            INSERT INTO sites (org_id, exit_node_id, name, subdomain, pub_key, subnet)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SITE_COLUMNS
        ))
        .bind(org_id)
        .bind(input.exit_node_id)
        .bind(&input.name)
        .bind(&input.subdomain)
        .bind(&input.pub_key)
        .bind(&input.subnet)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create site: {}", e))?;

        timer.observe_duration();

        info!(site_id = site.site_id, "Site created");

        Ok(site)
    }

    #[instrument(skip(self), fields(site_id = site_id, org_id = org_id))]
    async fn find_site(&self, site_id: i64, org_id: i64) -> Result<Option<Site>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_site"])
            .start_timer();

        let site = sqlx::query_as::<_, Site>(&format!(
            "SELECT {} FROM sites WHERE site_id = $1 AND org_id = $2",
            SITE_COLUMNS
        ))
        .bind(site_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get site: {}", e))?;

        timer.observe_duration();

        Ok(site)
    }

    #[instrument(skip(self, input), fields(resource_id = %resource_id, org_id = org_id, site_id = site_id))]
    async fn insert_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
        site_id: i64,
        input: &CreateResource,
    ) -> Result<Resource, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_resource"])
            .start_timer();

        let resource = sqlx::query_as::<_, Resource>(&format!(
            r#"
            INSERT INTO resources (resource_id, site_id, org_id, name, subdomain)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(resource_id)
        .bind(site_id)
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.subdomain)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create resource: {}", e))?;

        timer.observe_duration();

        info!("Resource created");

        Ok(resource)
    }

    #[instrument(skip(self), fields(resource_id = %resource_id, org_id = org_id))]
    async fn find_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
    ) -> Result<Option<Resource>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_resource"])
            .start_timer();

        let resource = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {} FROM resources WHERE resource_id = $1 AND org_id = $2",
            RESOURCE_COLUMNS
        ))
        .bind(resource_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get resource: {}", e))?;

        timer.observe_duration();

        Ok(resource)
    }

    #[instrument(skip(self, input), fields(resource_id = %resource_id, org_id = org_id))]
    async fn update_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, anyhow::Error> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_resource"])
            .start_timer();

        let resource = sqlx::query_as::<_, Resource>(&format!(
            r#"
            UPDATE resources
            SET name = COALESCE($3, name),
                subdomain = COALESCE($4, subdomain)
            WHERE resource_id = $1 AND org_id = $2
            RETURNING {}
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(resource_id)
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.subdomain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update resource: {}", e))?;

        timer.observe_duration();

        Ok(resource)
    }
}
