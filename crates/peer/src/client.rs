//! HTTP client for the remote SyncGuard peer.
//!
//! Every call is a single attempt with its own timeout; retry policy
//! belongs to the failover control loop, not here. POSTs carry the HMAC
//! signature headers, and key payloads are AEAD-encrypted before they
//! leave the process.

use crate::auth::{unix_now, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::error::{PeerError, PeerResult};
use crate::server::PeerHealth;
use std::time::Duration;
use syncguard_crypto::{auth, cipher};
use syncguard_types::ConsensusState;
use tracing::info;

const STATE_TIMEOUT: Duration = Duration::from_secs(5);
const KEY_TIMEOUT: Duration = Duration::from_secs(10);
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Client for the single remote peer.
pub struct PeerClient {
    address: String,
    secret: String,
    client: reqwest::Client,
}

impl PeerClient {
    /// Create a client for the peer at `address` ("host:port").
    pub fn new(address: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            secret: secret.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    fn signature_for(&self, method: &str, path: &str) -> (String, String) {
        let timestamp = unix_now();
        let message = auth::canonical_message(method, path, timestamp);
        (auth::sign(&message, &self.secret), timestamp.to_string())
    }

    fn check_status(path: &str, status: reqwest::StatusCode) -> PeerResult<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(PeerError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            })
        }
    }

    /// Fetch the peer's last-signed state.
    pub async fn fetch_state(&self) -> PeerResult<ConsensusState> {
        let path = "/validator_state";
        let response = self
            .client
            .get(self.url(path))
            .timeout(STATE_TIMEOUT)
            .send()
            .await?;
        Self::check_status(path, response.status())?;

        response
            .json::<ConsensusState>()
            .await
            .map_err(|e| PeerError::InvalidResponse {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    /// Fetch the peer's raw key file bytes.
    pub async fn fetch_key(&self) -> PeerResult<Vec<u8>> {
        let path = "/validator_key";
        let response = self
            .client
            .get(self.url(path))
            .timeout(KEY_TIMEOUT)
            .send()
            .await?;
        Self::check_status(path, response.status())?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Encrypt and push key bytes to the peer.
    pub async fn send_key(&self, key_bytes: &[u8]) -> PeerResult<()> {
        let path = "/validator_key";
        let blob = cipher::encrypt(key_bytes, &self.secret)?;
        let (signature, timestamp) = self.signature_for("POST", path);

        let response = self
            .client
            .post(self.url(path))
            .header(SIGNATURE_HEADER, signature)
            .header(TIMESTAMP_HEADER, timestamp)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(blob)
            .timeout(KEY_TIMEOUT)
            .send()
            .await?;
        Self::check_status(path, response.status())?;

        info!("Successfully transferred validator key to peer");
        Ok(())
    }

    /// Tell the peer this node has gone passive.
    pub async fn notify_failover(&self) -> PeerResult<()> {
        self.notify("/failover_notify").await
    }

    /// Tell the peer this node is reclaiming the active role.
    pub async fn notify_failback(&self) -> PeerResult<()> {
        self.notify("/failback_notify").await
    }

    async fn notify(&self, path: &str) -> PeerResult<()> {
        let (signature, timestamp) = self.signature_for("POST", path);
        let response = self
            .client
            .post(self.url(path))
            .header(SIGNATURE_HEADER, signature)
            .header(TIMESTAMP_HEADER, timestamp)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?;
        Self::check_status(path, response.status())
    }

    /// Fetch the peer's observability summary.
    pub async fn fetch_health(&self) -> PeerResult<PeerHealth> {
        let path = "/health";
        let response = self
            .client
            .get(self.url(path))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        Self::check_status(path, response.status())?;

        response
            .json::<PeerHealth>()
            .await
            .map_err(|e| PeerError::InvalidResponse {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}
