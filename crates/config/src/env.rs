//! Environment variable overrides.
//!
//! Every scalar config option can be overridden with a `SYNCGUARD_`
//! prefixed variable: the dotted path is upper-joined with underscores,
//! so `node.role` becomes `SYNCGUARD_NODE_ROLE`. Overrides are applied
//! after the file is parsed and before validation. Unset and empty
//! variables are ignored; list-valued options (`peers`, `validator.args`)
//! have no override.

use crate::config::{Config, SupervisionMode};
use crate::error::{ConfigError, ConfigResult};
use std::str::FromStr;
use syncguard_types::NodeRole;

const PREFIX: &str = "SYNCGUARD_";

fn lookup(suffix: &str) -> Option<(String, String)> {
    let key = format!("{}{}", PREFIX, suffix);
    match std::env::var(&key) {
        Ok(value) if !value.is_empty() => Some((key, value)),
        _ => None,
    }
}

fn parse<T: FromStr>(key: String, value: String) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidEnvValue { key, value })
}

/// Apply all recognized `SYNCGUARD_*` overrides to `config`.
pub fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // node
    if let Some((_, v)) = lookup("NODE_ID") {
        config.node.id = v;
    }
    if let Some((k, v)) = lookup("NODE_ROLE") {
        config.node.role = NodeRole::from_str(&v)
            .map_err(|_| ConfigError::InvalidEnvValue { key: k, value: v })?;
    }
    if let Some((k, v)) = lookup("NODE_IS_PRIMARY") {
        config.node.is_primary = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("NODE_PORT") {
        config.node.port = parse(k, v)?;
    }

    // cometbft
    if let Some((_, v)) = lookup("COMETBFT_RPC_URL") {
        config.cometbft.rpc_url = v;
    }
    if let Some((_, v)) = lookup("COMETBFT_KEY_PATH") {
        config.cometbft.key_path = v;
    }
    if let Some((_, v)) = lookup("COMETBFT_STATE_PATH") {
        config.cometbft.state_path = v;
    }
    if let Some((_, v)) = lookup("COMETBFT_BACKUP_PATH") {
        config.cometbft.backup_path = v;
    }

    // health
    if let Some((k, v)) = lookup("HEALTH_INTERVAL") {
        config.health.interval = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("HEALTH_MIN_PEERS") {
        config.health.min_peers = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("HEALTH_TIMEOUT") {
        config.health.timeout = parse(k, v)?;
    }

    // failover
    if let Some((k, v)) = lookup("FAILOVER_RETRY_ATTEMPTS") {
        config.failover.retry_attempts = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("FAILOVER_GRACE_PERIOD") {
        config.failover.grace_period = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("FAILOVER_STATE_SYNC_INTERVAL") {
        config.failover.state_sync_interval = parse(k, v)?;
    }

    // validator
    if let Some((k, v)) = lookup("VALIDATOR_ENABLED") {
        config.validator.enabled = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("VALIDATOR_MODE") {
        config.validator.mode = match v.as_str() {
            "binary" => SupervisionMode::Binary,
            "docker" => SupervisionMode::Docker,
            "docker-compose" => SupervisionMode::DockerCompose,
            _ => return Err(ConfigError::InvalidEnvValue { key: k, value: v }),
        };
    }
    if let Some((_, v)) = lookup("VALIDATOR_BINARY") {
        config.validator.binary = v;
    }
    if let Some((_, v)) = lookup("VALIDATOR_CONTAINER") {
        config.validator.container = v;
    }
    if let Some((_, v)) = lookup("VALIDATOR_COMPOSE_FILE") {
        config.validator.compose_file = v;
    }
    if let Some((_, v)) = lookup("VALIDATOR_SERVICE") {
        config.validator.service = v;
    }
    if let Some((k, v)) = lookup("VALIDATOR_STOP_TIMEOUT") {
        config.validator.stop_timeout = parse(k, v)?;
    }
    if let Some((k, v)) = lookup("VALIDATOR_RESTART_DELAY") {
        config.validator.restart_delay = parse(k, v)?;
    }

    // logging
    if let Some((_, v)) = lookup("LOGGING_LEVEL") {
        config.logging.level = v;
    }
    if let Some((_, v)) = lookup("LOGGING_FILE") {
        config.logging.file = Some(v);
    }
    if let Some((k, v)) = lookup("LOGGING_VERBOSE") {
        config.logging.verbose = parse(k, v)?;
    }

    // cluster
    if let Some((_, v)) = lookup("CLUSTER_SECRET") {
        config.cluster.secret = v;
    }
    if let Some((k, v)) = lookup("CLUSTER_MAX_CLOCK_SKEW") {
        config.cluster.max_clock_skew = parse(k, v)?;
    }

    Ok(())
}
