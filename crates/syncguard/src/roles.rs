//! Role ownership.
//!
//! `RoleState` is the single home of the node's role, failure counter,
//! and failback guard. Reads and writes of the fields take a short
//! rwlock; the transition mutex is held for the entire body of a role
//! transition (failover, failback, and inbound notifications) so only
//! one transition runs at a time. Lock order is always transition mutex
//! first, then the field lock.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use syncguard_peer::RoleAccess;
use syncguard_types::NodeRole;
use tokio::sync::{Mutex, OwnedMutexGuard};

struct RoleFields {
    role: NodeRole,
    failure_count: u32,
    failback_in_progress: bool,
}

/// The node's role, failure counter, and failback guard.
pub struct RoleState {
    fields: RwLock<RoleFields>,
    is_primary: bool,
    transition: Arc<Mutex<()>>,
}

impl RoleState {
    pub fn new(role: NodeRole, is_primary: bool) -> Self {
        Self {
            fields: RwLock::new(RoleFields {
                role,
                failure_count: 0,
                failback_in_progress: false,
            }),
            is_primary,
            transition: Arc::new(Mutex::new(())),
        }
    }

    pub fn role(&self) -> NodeRole {
        self.fields.read().role
    }

    /// Reset the consecutive-failure counter.
    pub fn reset_failures(&self) {
        self.fields.write().failure_count = 0;
    }

    /// Count one failed probe and return the new total.
    pub fn record_failure(&self) -> u32 {
        let mut fields = self.fields.write();
        fields.failure_count += 1;
        fields.failure_count
    }

    pub fn failure_count(&self) -> u32 {
        self.fields.read().failure_count
    }

    /// Claim the at-most-one-in-flight failback slot. Returns false when
    /// a failback attempt is already running.
    pub fn try_begin_failback(&self) -> bool {
        let mut fields = self.fields.write();
        if fields.failback_in_progress {
            return false;
        }
        fields.failback_in_progress = true;
        true
    }

    /// Release the failback slot.
    pub fn end_failback(&self) {
        self.fields.write().failback_in_progress = false;
    }

    pub fn failback_in_progress(&self) -> bool {
        self.fields.read().failback_in_progress
    }
}

#[async_trait]
impl RoleAccess for RoleState {
    fn is_active(&self) -> bool {
        self.fields.read().role.is_active()
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }

    fn set_active(&self, active: bool) {
        self.fields.write().role = if active {
            NodeRole::Active
        } else {
            NodeRole::Passive
        };
    }

    async fn transition_lock(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.transition).lock_owned().await
    }
}
