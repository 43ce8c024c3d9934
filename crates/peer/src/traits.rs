//! Capability interfaces between the peer server and the rest of the
//! node.
//!
//! Handlers never see the stores or the supervisor directly; they operate
//! on these narrow traits, so the server is exercised in tests with
//! mocks and the supervisor controls exactly what the protocol can
//! reach.

use async_trait::async_trait;
use syncguard_types::ConsensusState;
use tokio::sync::OwnedMutexGuard;

/// Read and lock the last-signed state file.
pub trait StateAccess: Send + Sync {
    fn load_state(&self) -> anyhow::Result<ConsensusState>;
    fn acquire_lock(&self) -> anyhow::Result<()>;
    fn release_lock(&self) -> anyhow::Result<()>;
}

/// Move the validator key file.
pub trait KeyAccess: Send + Sync {
    /// Raw key file contents for transfer.
    fn key_bytes(&self) -> anyhow::Result<Vec<u8>>;
    /// Validate and install received key bytes (already decrypted).
    fn install_key(&self, data: &[u8]) -> anyhow::Result<()>;
    /// Swap the real key for the mock key.
    fn deactivate_key(&self) -> anyhow::Result<()>;
}

/// Cached validator health.
pub trait HealthAccess: Send + Sync {
    fn is_healthy(&self) -> bool;
    fn last_height(&self) -> u64;
}

/// Role observation and transition.
#[async_trait]
pub trait RoleAccess: Send + Sync {
    fn is_active(&self) -> bool;
    fn is_primary(&self) -> bool;
    fn set_active(&self, active: bool);

    /// Acquire the node-wide role-transition mutex. Held for the whole
    /// body of an inbound failover/failback notification, the same lock
    /// the supervisor holds during its own transitions.
    async fn transition_lock(&self) -> OwnedMutexGuard<()>;
}

/// Restart the supervised validator process.
#[async_trait]
pub trait ValidatorRestart: Send + Sync {
    async fn restart(&self) -> anyhow::Result<()>;
}
