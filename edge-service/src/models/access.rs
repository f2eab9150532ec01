//! Access control models - memberships, grants and the caller context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Action;

/// Caller identity and organization scope for one permission check.
///
/// Populated by whatever authenticated the request. `role_id` is set when the
/// caller's role in `org_id` is already known, which skips the membership
/// lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<Uuid>,
    pub org_id: Option<i64>,
    pub role_id: Option<i64>,
}

impl RequestContext {
    /// Context for an authenticated user acting inside an organization.
    pub fn new(user_id: Uuid, org_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            org_id: Some(org_id),
            role_id: None,
        }
    }

    /// Attach a role that was already resolved for (user, org).
    pub fn with_role(mut self, role_id: i64) -> Self {
        self.role_id = Some(role_id);
        self
    }
}

/// User membership in an organization. One row per (user, org).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserOrgMembership {
    pub user_id: Uuid,
    pub org_id: i64,
    pub role_id: i64,
    pub created_utc: DateTime<Utc>,
}

/// Direct grant of an action to a user inside one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserAction {
    pub user_id: Uuid,
    pub action: Action,
    pub org_id: i64,
}

/// Grant of an action to every holder of a role inside one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAction {
    pub role_id: i64,
    pub action: Action,
    pub org_id: i64,
}
