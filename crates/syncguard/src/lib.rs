//! # SyncGuard
//!
//! A two-node, active-passive availability controller for a
//! CometBFT-family validator. Each node runs one SyncGuard instance that
//! monitors the local validator, and when the active node turns
//! unhealthy, coordinates a safe handoff of signing duties to the
//! passive peer: the private key moves, the last-signed consensus state
//! synchronizes, and the local validator restarts so exactly one side
//! ever holds a real key.
//!
//! The [`FailoverSupervisor`] owns the node's role and runs the control
//! loop; the subsystems it drives live in their own crates
//! (`syncguard-store`, `syncguard-health`, `syncguard-peer`,
//! `syncguard-process`).

mod bridges;
pub mod logging;
mod roles;
mod supervisor;

pub use roles::RoleState;
pub use supervisor::FailoverSupervisor;
