//! Double-sign protection ledger.
//!
//! Tracks every `(height, round, step)` position this node has been
//! observed to sign. A position is accepted only if it was never signed
//! before, does not fall below the last signed height, and advances the
//! step at its height and round. The set is bounded: once it exceeds the
//! cap (or on the periodic prune tick) entries older than
//! `last_signed_height - RETENTION_HEIGHTS` are dropped.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// Maximum number of retained positions before pruning kicks in.
const MAX_RECORDS: usize = 10_000;

/// Positions within this many heights of the last signed height are never
/// pruned.
const RETENTION_HEIGHTS: u64 = 1_000;

/// Interval of the periodic prune task.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct LedgerInner {
    records: BTreeSet<(u64, i32, i8)>,
    last_signed_height: u64,
}

/// In-memory set of signed positions with a monotone height watermark.
pub struct SignatureLedger {
    inner: RwLock<LedgerInner>,
}

impl SignatureLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner {
                records: BTreeSet::new(),
                last_signed_height: 0,
            }),
        }
    }

    /// Check whether signing at `(height, round, step)` is safe.
    pub fn check_sign(&self, height: u64, round: i32, step: i8) -> StoreResult<()> {
        let inner = self.inner.read();

        if inner.records.contains(&(height, round, step)) {
            return Err(StoreError::AlreadySigned {
                height,
                round,
                step,
            });
        }

        if height < inner.last_signed_height {
            return Err(StoreError::HeightRollback {
                height,
                last_signed: inner.last_signed_height,
            });
        }

        // At the same height and round, the step must strictly advance.
        let highest_step = inner
            .records
            .range((height, round, i8::MIN)..=(height, round, i8::MAX))
            .next_back()
            .map(|&(_, _, s)| s);
        if let Some(prev_step) = highest_step {
            if step <= prev_step {
                return Err(StoreError::StepRegression {
                    height,
                    round,
                    prev_step,
                    step,
                });
            }
        }

        Ok(())
    }

    /// Boolean form of [`check_sign`](Self::check_sign).
    pub fn can_sign(&self, height: u64, round: i32, step: i8) -> bool {
        self.check_sign(height, round, step).is_ok()
    }

    /// Record that `(height, round, step)` has been signed.
    pub fn record(&self, height: u64, round: i32, step: i8) -> StoreResult<()> {
        let mut inner = self.inner.write();

        if !inner.records.insert((height, round, step)) {
            return Err(StoreError::DuplicateRecord {
                height,
                round,
                step,
            });
        }

        if height > inner.last_signed_height {
            inner.last_signed_height = height;
        }

        if inner.records.len() > MAX_RECORDS {
            prune_locked(&mut inner);
        }

        Ok(())
    }

    /// The highest height this node has signed.
    pub fn last_signed_height(&self) -> u64 {
        self.inner.read().last_signed_height
    }

    /// Number of retained positions.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Drop positions older than the retention window.
    pub fn prune(&self) {
        prune_locked(&mut self.inner.write());
    }

    /// Prune on a fixed interval until the shutdown signal fires.
    pub async fn run_pruner(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.prune(),
                _ = shutdown.recv() => return,
            }
        }
    }
}

impl Default for SignatureLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn prune_locked(inner: &mut LedgerInner) {
    if inner.records.len() <= MAX_RECORDS / 2 {
        return;
    }

    let min_height = inner.last_signed_height.saturating_sub(RETENTION_HEIGHTS);
    let before = inner.records.len();
    inner.records = inner.records.split_off(&(min_height, i32::MIN, i8::MIN));
    debug!(
        "Pruned {} signature records below height {}",
        before - inner.records.len(),
        min_height
    );
}
