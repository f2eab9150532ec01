//! Services module for edge-service.

pub mod database;
pub mod error;
pub mod metrics;
pub mod mock_store;
pub mod peer_config;
pub mod permission;
pub mod store;
pub mod topology;

pub use database::Database;
pub use error::ServiceError;
pub use metrics::{get_metrics, init_metrics, record_error, record_permission_check};
pub use mock_store::MockStore;
pub use peer_config::PeerConfigService;
pub use permission::PermissionService;
pub use store::{PermissionStore, TopologyStore, TopologyWriter};
pub use topology::TopologyService;
