//! Exit node peer configuration.
//!
//! Builds the WireGuard interface document for one exit node: the node's own
//! key, port and address, plus one peer per attached site whose allowed IPs
//! are the `/32` addresses of every target behind that site.

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

use super::error::ServiceError;
use super::metrics::{record_error, PEER_CONFIG_BUILDS_TOTAL, PEER_CONFIG_BUILD_DURATION};
use super::store::TopologyStore;
use crate::models::{ExitNodeConfig, PeerConfig, Site};

/// Assembles exit node configuration from the current topology.
#[derive(Clone)]
pub struct PeerConfigService {
    store: Arc<dyn TopologyStore>,
}

impl PeerConfigService {
    pub fn new(store: Arc<dyn TopologyStore>) -> Self {
        Self { store }
    }

    /// Build the configuration for `exit_node_id`.
    ///
    /// Sites are fetched concurrently, and within each site its resources'
    /// targets are fetched concurrently. The first store failure cancels the
    /// remaining fetches and the whole build fails. Peer and allowed-IP order
    /// follow store order and are not stable.
    #[instrument(skip(self), fields(exit_node_id = exit_node_id))]
    pub async fn build_exit_node_config(
        &self,
        exit_node_id: i64,
    ) -> Result<ExitNodeConfig, ServiceError> {
        let start = Instant::now();
        let result = self.assemble(exit_node_id).await;

        let status = match &result {
            Ok(config) => {
                info!(peer_count = config.peers.len(), "Exit node configuration built");
                "ok"
            }
            Err(ServiceError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        PEER_CONFIG_BUILDS_TOTAL.with_label_values(&[status]).inc();
        PEER_CONFIG_BUILD_DURATION
            .with_label_values(&[status])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn assemble(&self, exit_node_id: i64) -> Result<ExitNodeConfig, ServiceError> {
        let exit_node = self
            .store
            .find_exit_node(exit_node_id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| ServiceError::NotFound("Exit node not found".to_string()))?;

        let sites = self
            .store
            .list_sites_for_exit_node(exit_node_id)
            .await
            .map_err(store_failure)?;

        let peers = try_join_all(sites.iter().map(|site| self.peer_for_site(site)))
            .await
            .map_err(store_failure)?;

        Ok(ExitNodeConfig {
            private_key: exit_node.private_key,
            listen_port: exit_node.listen_port,
            ip_address: exit_node.address,
            peers,
        })
    }

    async fn peer_for_site(&self, site: &Site) -> Result<PeerConfig, anyhow::Error> {
        let resources = self.store.list_resources_for_site(site.site_id).await?;

        let per_resource = try_join_all(resources.iter().map(|resource| async move {
            let targets = self
                .store
                .list_targets_for_resource(resource.resource_id)
                .await?;
            Ok::<_, anyhow::Error>(targets.iter().map(|t| t.allowed_ip()).collect::<Vec<_>>())
        }))
        .await?;

        Ok(PeerConfig {
            public_key: site.pub_key.clone(),
            allowed_ips: per_resource.into_iter().flatten().collect(),
        })
    }
}

fn store_failure(e: anyhow::Error) -> ServiceError {
    error!(error = %e, "Error querying topology");
    record_error("topology_store");
    ServiceError::Internal(anyhow::anyhow!(
        "Error occurred while generating configuration: {}",
        e
    ))
}
