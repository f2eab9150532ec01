//! Topology operations guarded by action permissions.
//!
//! Each operation validates its input, then asks [`PermissionService`] for
//! the matching action, and only then touches the writer. A rejected input or
//! a refused permission leaves the store untouched. Every read and write is
//! scoped to the caller's organization: rows owned by another organization
//! are reported as not found.

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::error::ServiceError;
use super::permission::PermissionService;
use super::store::TopologyWriter;
use crate::models::{Action, CreateResource, CreateSite, RequestContext, Resource, Site, UpdateResource};

#[derive(Clone)]
pub struct TopologyService {
    permissions: PermissionService,
    writer: Arc<dyn TopologyWriter>,
}

impl TopologyService {
    pub fn new(permissions: PermissionService, writer: Arc<dyn TopologyWriter>) -> Self {
        Self {
            permissions,
            writer,
        }
    }

    /// Create a site in the caller's organization.
    #[instrument(skip(self, ctx, input), fields(org_id = ?ctx.org_id))]
    pub async fn create_site(
        &self,
        ctx: &RequestContext,
        input: CreateSite,
    ) -> Result<Site, ServiceError> {
        input.validate()?;
        let org_id = self.authorize(Action::CreateSite, ctx).await?;

        let site = self.writer.insert_site(org_id, &input).await?;
        info!(site_id = site.site_id, "Site created");
        Ok(site)
    }

    /// Create a resource under `site_id`, which must belong to the caller's
    /// organization.
    #[instrument(skip(self, ctx, input), fields(org_id = ?ctx.org_id, site_id = site_id))]
    pub async fn create_resource(
        &self,
        ctx: &RequestContext,
        site_id: i64,
        input: CreateResource,
    ) -> Result<Resource, ServiceError> {
        input.validate()?;
        let org_id = self.authorize(Action::CreateResource, ctx).await?;

        if self.writer.find_site(site_id, org_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Site with ID {} not found",
                site_id
            )));
        }

        let resource = self
            .writer
            .insert_resource(Uuid::new_v4(), org_id, site_id, &input)
            .await?;
        info!(resource_id = %resource.resource_id, "Resource created");
        Ok(resource)
    }

    #[instrument(skip(self, ctx), fields(resource_id = %resource_id))]
    pub async fn get_resource(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
    ) -> Result<Resource, ServiceError> {
        let org_id = self.authorize(Action::GetResource, ctx).await?;

        self.writer
            .find_resource(resource_id, org_id)
            .await?
            .ok_or_else(|| resource_not_found(resource_id))
    }

    #[instrument(skip(self, ctx, input), fields(resource_id = %resource_id))]
    pub async fn update_resource(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        input: UpdateResource,
    ) -> Result<Resource, ServiceError> {
        if input.is_empty() {
            return Err(ServiceError::BadRequest(
                "At least one field must be provided for update".to_string(),
            ));
        }
        input.validate()?;
        let org_id = self.authorize(Action::UpdateResource, ctx).await?;

        let resource = self
            .writer
            .update_resource(resource_id, org_id, &input)
            .await?
            .ok_or_else(|| resource_not_found(resource_id))?;
        info!("Resource updated");
        Ok(resource)
    }

    /// Require `action` and return the organization it was granted in.
    async fn authorize(&self, action: Action, ctx: &RequestContext) -> Result<i64, ServiceError> {
        self.permissions.require_action(action, ctx).await?;
        ctx.org_id
            .ok_or_else(|| ServiceError::BadRequest("Organization ID is required".to_string()))
    }
}

fn resource_not_found(resource_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Resource with ID {} not found", resource_id))
}
