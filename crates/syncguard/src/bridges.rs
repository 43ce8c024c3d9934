//! Capability bridges.
//!
//! Small adapters implementing the peer server's capability traits over
//! the concrete stores, prober, and process manager, so the protocol
//! layer never depends on them directly.

use async_trait::async_trait;
use std::sync::Arc;
use syncguard_health::HealthProber;
use syncguard_peer::{HealthAccess, KeyAccess, StateAccess, ValidatorRestart};
use syncguard_process::ProcessManager;
use syncguard_store::{KeyStore, StateStore};
use syncguard_types::ConsensusState;

pub(crate) struct StateBridge(pub Arc<StateStore>);

impl StateAccess for StateBridge {
    fn load_state(&self) -> anyhow::Result<ConsensusState> {
        Ok(self.0.load_state()?)
    }

    fn acquire_lock(&self) -> anyhow::Result<()> {
        Ok(self.0.acquire_lock()?)
    }

    fn release_lock(&self) -> anyhow::Result<()> {
        Ok(self.0.release_lock()?)
    }
}

pub(crate) struct KeyBridge(pub Arc<KeyStore>);

impl KeyAccess for KeyBridge {
    fn key_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(self.0.bytes()?)
    }

    fn install_key(&self, data: &[u8]) -> anyhow::Result<()> {
        Ok(self.0.install_from_bytes(data)?)
    }

    fn deactivate_key(&self) -> anyhow::Result<()> {
        Ok(self.0.deactivate()?)
    }
}

pub(crate) struct HealthBridge(pub Arc<HealthProber>);

impl HealthAccess for HealthBridge {
    fn is_healthy(&self) -> bool {
        self.0.is_healthy()
    }

    fn last_height(&self) -> u64 {
        self.0.last_height()
    }
}

pub(crate) struct RestartBridge(pub Arc<dyn ProcessManager>);

#[async_trait]
impl ValidatorRestart for RestartBridge {
    async fn restart(&self) -> anyhow::Result<()> {
        Ok(self.0.restart().await?)
    }
}
