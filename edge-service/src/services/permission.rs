//! Action permission checks.
//!
//! A (user, organization, action) triple is permitted when the user holds a
//! direct grant for the action in that organization, or when the user's role
//! in that organization holds one. Direct grants are checked first and win.
//! Every lookup is keyed by organization, so a grant never leaks across
//! tenants. Nothing is cached: each call reads current grants.

use std::sync::Arc;
use tracing::{error, instrument, warn};

use super::error::ServiceError;
use super::metrics::{record_error, record_permission_check};
use super::store::PermissionStore;
use crate::models::{Action, RequestContext};

/// Resolves whether a caller may perform an action inside an organization.
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn PermissionStore>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self { store }
    }

    /// Decide whether `ctx` may perform `action`.
    ///
    /// Returns `Ok(false)` when no grant matches. Errors mean the decision
    /// could not be made and the guarded operation must be refused:
    /// - `Unauthenticated` when the context has no user
    /// - `BadRequest` when the context has no organization
    /// - `Forbidden` when the user is not a member of the organization
    /// - `Internal` when the store fails
    #[instrument(
        skip(self, ctx),
        fields(action = %action, user_id = ?ctx.user_id, org_id = ?ctx.org_id)
    )]
    pub async fn is_action_permitted(
        &self,
        action: Action,
        ctx: &RequestContext,
    ) -> Result<bool, ServiceError> {
        let user_id = ctx.user_id.ok_or(ServiceError::Unauthenticated)?;
        let org_id = ctx.org_id.ok_or_else(|| {
            ServiceError::BadRequest("Organization ID is required".to_string())
        })?;

        let role_id = match ctx.role_id {
            Some(role_id) => role_id,
            None => self
                .store
                .find_membership_role(user_id, org_id)
                .await
                .map_err(|e| store_failure(action, e))?
                .ok_or_else(|| {
                    warn!("User has no membership in organization");
                    record_permission_check(action.as_str(), "no_membership");
                    ServiceError::Forbidden(
                        "User does not have access to this organization".to_string(),
                    )
                })?,
        };

        let direct = self
            .store
            .has_user_action(user_id, action, org_id)
            .await
            .map_err(|e| store_failure(action, e))?;
        if direct {
            record_permission_check(action.as_str(), "allowed");
            return Ok(true);
        }

        let by_role = self
            .store
            .has_role_action(role_id, action, org_id)
            .await
            .map_err(|e| store_failure(action, e))?;

        record_permission_check(action.as_str(), if by_role { "allowed" } else { "denied" });
        Ok(by_role)
    }

    /// Like [`is_action_permitted`](Self::is_action_permitted), but a `false`
    /// decision becomes `Forbidden`.
    pub async fn require_action(
        &self,
        action: Action,
        ctx: &RequestContext,
    ) -> Result<(), ServiceError> {
        if self.is_action_permitted(action, ctx).await? {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "User does not have permission to perform {}",
                action
            )))
        }
    }
}

fn store_failure(action: Action, e: anyhow::Error) -> ServiceError {
    error!(error = %e, "Error checking user action permission");
    record_permission_check(action.as_str(), "error");
    record_error("permission_store");
    ServiceError::Internal(anyhow::anyhow!("Error checking action permission: {}", e))
}
