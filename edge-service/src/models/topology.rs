//! Topology models - exit nodes, sites, resources and targets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Tunnel endpoint that terminates the WireGuard peers of its sites.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExitNode {
    pub exit_node_id: i64,
    pub name: String,
    pub address: String,
    pub private_key: String,
    pub listen_port: i32,
}

/// Site attached to an organization and, once provisioned, to an exit node.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Site {
    pub site_id: i64,
    pub org_id: i64,
    pub exit_node_id: Option<i64>,
    pub name: String,
    pub subdomain: Option<String>,
    pub pub_key: String,
    pub subnet: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Resource exposed through a site.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Resource {
    pub resource_id: Uuid,
    pub site_id: i64,
    pub org_id: i64,
    pub name: String,
    pub subdomain: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Backend address that a resource forwards to.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Target {
    pub target_id: i64,
    pub resource_id: Uuid,
    pub ip: String,
    pub method: Option<String>,
    pub port: Option<i32>,
    pub protocol: Option<String>,
}

impl Target {
    /// Single-host allowed-IP entry for this target.
    pub fn allowed_ip(&self) -> String {
        format!("{}/32", self.ip)
    }
}

/// Input for creating a new site.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSite {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub subdomain: Option<String>,
    #[validate(length(min = 1))]
    pub pub_key: String,
    pub subnet: Option<String>,
    pub exit_node_id: Option<i64>,
}

/// Input for creating a new resource.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateResource {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub subdomain: Option<String>,
}

/// Partial update of a resource. At least one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateResource {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub subdomain: Option<String>,
}

impl UpdateResource {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.subdomain.is_none()
    }
}
