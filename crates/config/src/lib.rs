//! # SyncGuard Config
//!
//! Configuration loading for the SyncGuard failover controller. All
//! settings live in a single `config.yaml` (the single-config philosophy),
//! with `SYNCGUARD_*` environment overrides for every scalar option.
//!
//! ## Example
//!
//! ```rust
//! use syncguard_config::Config;
//!
//! let yaml = r#"
//! node:
//!   id: guard-a
//!   role: active
//!   is_primary: true
//! peers:
//!   - id: guard-b
//!     address: 10.0.0.2:8080
//! cometbft:
//!   rpc_url: http://127.0.0.1:26657
//!   key_path: /data/config/priv_validator_key.json
//!   state_path: /data/data/priv_validator_state.json
//! cluster:
//!   secret: example-secret
//! "#;
//!
//! let config = Config::from_str(yaml).unwrap();
//! assert!(config.node.role.is_active());
//! ```

mod config;
mod env;
mod error;

pub use config::{
    ClusterConfig, CometbftConfig, Config, FailoverConfig, HealthConfig, LoggingConfig,
    NodeConfig, PeerConfig, SupervisionMode, ValidatorConfig,
};
pub use env::apply_env_overrides;
pub use error::{ConfigError, ConfigResult};
