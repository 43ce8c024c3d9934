//! # SyncGuard Health
//!
//! Probes the supervised validator's RPC to derive a single healthy bit.
//! A probe issues two GETs against the validator RPC - `/status` and
//! `/net_info` - and the node is healthy iff it is not catching up, has
//! at least the configured number of peers, and both requests succeeded.
//!
//! Probes never surface transport or parse errors: any failure degrades
//! to `healthy = false`. The prober itself never retries; the failover
//! control loop's failure counter is the only retry policy.

mod prober;

pub use prober::{HealthProber, NodeHealth};
