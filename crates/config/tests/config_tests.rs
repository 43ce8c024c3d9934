//! Tests for configuration loading and validation.

use syncguard_config::{Config, ConfigError, SupervisionMode};
use syncguard_types::NodeRole;

const MINIMAL: &str = r#"
node:
  id: guard-a
peers:
  - id: guard-b
    address: 10.0.0.2:8080
cometbft:
  rpc_url: http://127.0.0.1:26657
  key_path: /data/config/priv_validator_key.json
  state_path: /data/data/priv_validator_state.json
cluster:
  secret: test-secret
"#;

#[test]
fn test_minimal_config_with_defaults() {
    let config = Config::from_str(MINIMAL).unwrap();

    assert_eq!(config.node.role, NodeRole::Passive);
    assert!(!config.node.is_primary);
    assert_eq!(config.node.port, 8080);
    assert_eq!(config.health.interval, 5.0);
    assert_eq!(config.health.min_peers, 1);
    assert_eq!(config.failover.retry_attempts, 3);
    assert_eq!(config.failover.grace_period, 60.0);
    assert_eq!(config.failover.state_sync_interval, 5.0);
    assert!(!config.validator.enabled);
    assert_eq!(config.validator.stop_timeout, 30.0);
    assert_eq!(config.validator.restart_delay, 2.0);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.cluster.max_clock_skew, 30.0);
}

#[test]
fn test_missing_node_id_rejected() {
    let yaml = MINIMAL.replace("id: guard-a", "id: \"\"");
    assert!(matches!(
        Config::from_str(&yaml),
        Err(ConfigError::MissingField("node.id"))
    ));
}

#[test]
fn test_missing_cluster_secret_rejected() {
    let yaml = MINIMAL.replace("secret: test-secret", "secret: \"\"");
    assert!(matches!(
        Config::from_str(&yaml),
        Err(ConfigError::MissingField("cluster.secret"))
    ));
}

#[test]
fn test_peer_count_must_be_one() {
    let yaml = MINIMAL.replace(
        "peers:\n  - id: guard-b\n    address: 10.0.0.2:8080",
        "peers: []",
    );
    assert!(matches!(
        Config::from_str(&yaml),
        Err(ConfigError::PeerCount(0))
    ));
}

#[test]
fn test_invalid_role_rejected() {
    let yaml = format!("{}\n", MINIMAL).replace("id: guard-a", "id: guard-a\n  role: standby");
    assert!(Config::from_str(&yaml).is_err());
}

#[test]
fn test_validator_mode_requirements() {
    let yaml = format!(
        "{}validator:\n  enabled: true\n  mode: docker-compose\n  compose_file: docker-compose.yml\n",
        MINIMAL
    );
    assert!(matches!(
        Config::from_str(&yaml),
        Err(ConfigError::MissingField("validator.service"))
    ));

    let yaml = format!(
        "{}validator:\n  enabled: true\n  mode: docker\n  container: validator\n",
        MINIMAL
    );
    let config = Config::from_str(&yaml).unwrap();
    assert_eq!(config.validator.mode, SupervisionMode::Docker);
}

#[test]
fn test_invalid_log_level_rejected() {
    let yaml = format!("{}logging:\n  level: loud\n", MINIMAL);
    assert!(matches!(
        Config::from_str(&yaml),
        Err(ConfigError::InvalidLogLevel(_))
    ));
}

#[test]
fn test_duration_helpers() {
    let config = Config::from_str(MINIMAL).unwrap();
    assert_eq!(config.health.interval().as_secs(), 5);
    assert_eq!(config.failover.grace_period().as_secs(), 60);
    assert_eq!(config.validator.stop_timeout().as_secs(), 30);
    assert_eq!(config.cluster.max_clock_skew().as_secs(), 30);
}

// Environment overrides are process-global, so both cases run in one test
// to avoid cross-test interference.
#[test]
fn test_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, MINIMAL).unwrap();

    std::env::set_var("SYNCGUARD_NODE_ROLE", "active");
    std::env::set_var("SYNCGUARD_FAILOVER_RETRY_ATTEMPTS", "5");
    let config = Config::load(&path).unwrap();
    std::env::remove_var("SYNCGUARD_NODE_ROLE");
    std::env::remove_var("SYNCGUARD_FAILOVER_RETRY_ATTEMPTS");

    assert_eq!(config.node.role, NodeRole::Active);
    assert_eq!(config.failover.retry_attempts, 5);

    std::env::set_var("SYNCGUARD_NODE_PORT", "not-a-port");
    let result = Config::load(&path);
    std::env::remove_var("SYNCGUARD_NODE_PORT");

    assert!(matches!(result, Err(ConfigError::InvalidEnvValue { .. })));
}
