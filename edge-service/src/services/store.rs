//! Store seams consumed by the permission, peer config and topology services.
//!
//! `Database` implements these against PostgreSQL; `MockStore` implements
//! them in memory for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Action, CreateResource, CreateSite, ExitNode, Resource, Site, Target, UpdateResource};

/// Read access to memberships and grants. All lookups are scoped by organization.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Role held by `user_id` in `org_id`, if the user is a member.
    async fn find_membership_role(
        &self,
        user_id: Uuid,
        org_id: i64,
    ) -> Result<Option<i64>, anyhow::Error>;

    /// Whether a direct (user, action, org) grant exists.
    async fn has_user_action(
        &self,
        user_id: Uuid,
        action: Action,
        org_id: i64,
    ) -> Result<bool, anyhow::Error>;

    /// Whether a (role, action, org) grant exists.
    async fn has_role_action(
        &self,
        role_id: i64,
        action: Action,
        org_id: i64,
    ) -> Result<bool, anyhow::Error>;
}

/// Read access to the exit node → site → resource → target tree.
#[async_trait]
pub trait TopologyStore: Send + Sync {
    async fn find_exit_node(&self, exit_node_id: i64) -> Result<Option<ExitNode>, anyhow::Error>;

    async fn list_sites_for_exit_node(&self, exit_node_id: i64)
        -> Result<Vec<Site>, anyhow::Error>;

    async fn list_resources_for_site(&self, site_id: i64) -> Result<Vec<Resource>, anyhow::Error>;

    async fn list_targets_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<Target>, anyhow::Error>;
}

/// Writes behind the guarded site and resource operations.
///
/// Every lookup takes the caller's organization: a row owned by another
/// organization is reported as absent.
#[async_trait]
pub trait TopologyWriter: Send + Sync {
    async fn insert_site(&self, org_id: i64, input: &CreateSite) -> Result<Site, anyhow::Error>;

    async fn find_site(&self, site_id: i64, org_id: i64) -> Result<Option<Site>, anyhow::Error>;

    async fn insert_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
        site_id: i64,
        input: &CreateResource,
    ) -> Result<Resource, anyhow::Error>;

    async fn find_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
    ) -> Result<Option<Resource>, anyhow::Error>;

    /// Apply the set fields of `input`. Returns `None` when the resource does
    /// not exist in `org_id`.
    async fn update_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, anyhow::Error>;
}
