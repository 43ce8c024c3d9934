//! Validator RPC prober with a cached last result.

use parking_lot::RwLock;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of one health probe.
#[derive(Debug, Clone, Default)]
pub struct NodeHealth {
    /// The derived healthy bit.
    pub healthy: bool,
    /// Whether the validator reports it is still catching up.
    pub syncing: bool,
    /// Latest block height reported by the validator.
    pub height: u64,
    /// Number of connected peers.
    pub peers: u32,
}

// Serde views of the two validator RPC responses. Numeric fields arrive
// as decimal strings.

#[derive(Deserialize)]
struct StatusResponse {
    result: StatusResult,
}

#[derive(Deserialize)]
struct StatusResult {
    sync_info: SyncInfo,
}

#[derive(Deserialize)]
struct SyncInfo {
    latest_block_height: String,
    catching_up: bool,
}

#[derive(Deserialize)]
struct NetInfoResponse {
    result: NetInfoResult,
}

#[derive(Deserialize)]
struct NetInfoResult {
    n_peers: String,
}

/// Periodically queried by the failover supervisor; also consulted by
/// peer `/health` responses through the cached result.
pub struct HealthProber {
    rpc_url: String,
    min_peers: u32,
    client: reqwest::Client,
    last: RwLock<Option<NodeHealth>>,
}

impl HealthProber {
    /// Create a prober for the given validator RPC base URL.
    ///
    /// `timeout` bounds each of the two HTTP requests of a probe.
    pub fn new(rpc_url: impl Into<String>, min_peers: u32, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            rpc_url: rpc_url.into(),
            min_peers,
            client,
            last: RwLock::new(None),
        }
    }

    /// Run one probe and cache the result. Never fails: transport and
    /// parse errors yield an unhealthy result.
    pub async fn check(&self) -> NodeHealth {
        let mut health = NodeHealth::default();

        match self.fetch_status().await {
            Ok((height, catching_up)) => {
                health.height = height;
                health.syncing = catching_up;
                health.healthy = !catching_up;
            }
            Err(e) => {
                warn!("Validator status probe failed: {}", e);
                health.healthy = false;
            }
        }

        match self.fetch_peer_count().await {
            Ok(peers) => {
                health.peers = peers;
                if peers < self.min_peers {
                    health.healthy = false;
                }
            }
            Err(e) => {
                warn!("Validator net_info probe failed: {}", e);
                health.healthy = false;
            }
        }

        debug!(
            "Health probe: healthy={} syncing={} height={} peers={}",
            health.healthy, health.syncing, health.height, health.peers
        );

        *self.last.write() = Some(health.clone());
        health
    }

    /// The healthy bit of the most recent probe; false before the first
    /// probe completes.
    pub fn is_healthy(&self) -> bool {
        self.last.read().as_ref().is_some_and(|h| h.healthy)
    }

    /// Latest block height seen by the most recent probe.
    pub fn last_height(&self) -> u64 {
        self.last.read().as_ref().map_or(0, |h| h.height)
    }

    /// The most recent probe result, if any.
    pub fn last_result(&self) -> Option<NodeHealth> {
        self.last.read().clone()
    }

    async fn fetch_status(&self) -> Result<(u64, bool), String> {
        let url = format!("{}/status", self.rpc_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("validator returned status {}", response.status()));
        }

        let status: StatusResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid status response: {}", e))?;

        let height = status
            .result
            .sync_info
            .latest_block_height
            .parse::<u64>()
            .map_err(|e| format!("invalid block height: {}", e))?;

        Ok((height, status.result.sync_info.catching_up))
    }

    async fn fetch_peer_count(&self) -> Result<u32, String> {
        let url = format!("{}/net_info", self.rpc_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("net_info returned status {}", response.status()));
        }

        let net_info: NetInfoResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid net_info response: {}", e))?;

        net_info
            .result
            .n_peers
            .parse::<u32>()
            .map_err(|e| format!("invalid peer count: {}", e))
    }
}
