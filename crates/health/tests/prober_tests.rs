//! Tests for the health prober against an in-process stub of the
//! validator RPC.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use syncguard_health::HealthProber;

#[derive(Default)]
struct StubValidator {
    catching_up: AtomicBool,
    height: AtomicU32,
    peers: AtomicU32,
}

async fn status(State(stub): State<Arc<StubValidator>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "result": {
            "sync_info": {
                "latest_block_height": stub.height.load(Ordering::SeqCst).to_string(),
                "catching_up": stub.catching_up.load(Ordering::SeqCst),
            }
        }
    }))
}

async fn net_info(State(stub): State<Arc<StubValidator>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "result": { "n_peers": stub.peers.load(Ordering::SeqCst).to_string() }
    }))
}

async fn spawn_stub(stub: Arc<StubValidator>) -> SocketAddr {
    let app = Router::new()
        .route("/status", get(status))
        .route("/net_info", get(net_info))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn prober_for(addr: SocketAddr, min_peers: u32) -> HealthProber {
    HealthProber::new(
        format!("http://{}", addr),
        min_peers,
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn test_healthy_validator() {
    let stub = Arc::new(StubValidator::default());
    stub.height.store(1043, Ordering::SeqCst);
    stub.peers.store(5, Ordering::SeqCst);
    let addr = spawn_stub(Arc::clone(&stub)).await;

    let prober = prober_for(addr, 1);
    let health = prober.check().await;

    assert!(health.healthy);
    assert!(!health.syncing);
    assert_eq!(health.height, 1043);
    assert_eq!(health.peers, 5);
    assert!(prober.is_healthy());
    assert_eq!(prober.last_height(), 1043);
}

#[tokio::test]
async fn test_catching_up_is_unhealthy() {
    let stub = Arc::new(StubValidator::default());
    stub.catching_up.store(true, Ordering::SeqCst);
    stub.peers.store(5, Ordering::SeqCst);
    let addr = spawn_stub(stub).await;

    let prober = prober_for(addr, 1);
    let health = prober.check().await;

    assert!(!health.healthy);
    assert!(health.syncing);
}

#[tokio::test]
async fn test_too_few_peers_is_unhealthy() {
    let stub = Arc::new(StubValidator::default());
    stub.peers.store(1, Ordering::SeqCst);
    let addr = spawn_stub(stub).await;

    let prober = prober_for(addr, 3);
    let health = prober.check().await;

    assert!(!health.healthy);
    assert_eq!(health.peers, 1);
}

#[tokio::test]
async fn test_unreachable_validator_is_unhealthy() {
    // Nothing is listening here.
    let prober = HealthProber::new("http://127.0.0.1:1", 1, Duration::from_millis(300));
    let health = prober.check().await;

    assert!(!health.healthy);
    assert_eq!(health.height, 0);
}

#[tokio::test]
async fn test_cache_before_first_probe() {
    let prober = HealthProber::new("http://127.0.0.1:1", 1, Duration::from_millis(300));
    assert!(!prober.is_healthy());
    assert_eq!(prober.last_height(), 0);
    assert!(prober.last_result().is_none());
}

#[tokio::test]
async fn test_recovery_flips_cached_bit() {
    let stub = Arc::new(StubValidator::default());
    stub.catching_up.store(true, Ordering::SeqCst);
    stub.peers.store(2, Ordering::SeqCst);
    let addr = spawn_stub(Arc::clone(&stub)).await;

    let prober = prober_for(addr, 1);
    prober.check().await;
    assert!(!prober.is_healthy());

    stub.catching_up.store(false, Ordering::SeqCst);
    prober.check().await;
    assert!(prober.is_healthy());
}
