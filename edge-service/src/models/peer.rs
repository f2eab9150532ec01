//! WireGuard interface document served to exit nodes.

use serde::{Deserialize, Serialize};

/// One remote tunnel endpoint: a site and the addresses it may source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerConfig {
    pub public_key: String,
    pub allowed_ips: Vec<String>,
}

/// Interface configuration for an exit node and all of its peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitNodeConfig {
    pub private_key: String,
    pub listen_port: i32,
    pub ip_address: String,
    pub peers: Vec<PeerConfig>,
}
