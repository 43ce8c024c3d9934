//! The peer coordination server.

use crate::auth::{require_signature, AuthState};
use crate::error::PeerResult;
use crate::traits::{HealthAccess, KeyAccess, RoleAccess, StateAccess, ValidatorRestart};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use syncguard_crypto::cipher;
use tracing::{error, info};

/// Peer server settings.
#[derive(Debug, Clone)]
pub struct PeerServerConfig {
    /// Listen port for the peer protocol.
    pub port: u16,
    /// Shared cluster secret for request authentication and key
    /// transport.
    pub secret: String,
    /// Replay-protection window for signed requests.
    pub max_clock_skew: Duration,
}

/// The `/health` response body, also consumed by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerHealth {
    pub healthy: bool,
    pub active: bool,
    pub primary: bool,
    pub height: u64,
}

/// Everything the handlers are allowed to touch.
pub struct PeerContext {
    state: Arc<dyn StateAccess>,
    key: Arc<dyn KeyAccess>,
    health: Arc<dyn HealthAccess>,
    role: Arc<dyn RoleAccess>,
    restarter: Option<Arc<dyn ValidatorRestart>>,
    secret: String,
}

/// HTTP server for peer coordination.
pub struct PeerServer {
    config: PeerServerConfig,
    context: Arc<PeerContext>,
}

impl PeerServer {
    pub fn new(
        config: PeerServerConfig,
        state: Arc<dyn StateAccess>,
        key: Arc<dyn KeyAccess>,
        health: Arc<dyn HealthAccess>,
        role: Arc<dyn RoleAccess>,
        restarter: Option<Arc<dyn ValidatorRestart>>,
    ) -> Self {
        let context = Arc::new(PeerContext {
            state,
            key,
            health,
            role,
            restarter,
            secret: config.secret.clone(),
        });
        Self { config, context }
    }

    /// Build the router. Exposed so tests can serve it on an ephemeral
    /// port.
    pub fn router(&self) -> Router {
        let auth_state = Arc::new(AuthState {
            secret: self.config.secret.clone(),
            max_clock_skew: self.config.max_clock_skew,
        });

        Router::new()
            .route("/validator_state", get(get_state))
            .route("/validator_key", get(get_key).post(post_key))
            .route("/failover_notify", post(failover_notify))
            .route("/failback_notify", post(failback_notify))
            .route("/health", get(get_health))
            .layer(middleware::from_fn_with_state(auth_state, require_signature))
            .with_state(Arc::clone(&self.context))
    }

    /// Serve until the shutdown signal fires, then drain gracefully.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> PeerResult<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Peer server listening on {}", addr);

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        info!("Peer server stopped");
        Ok(())
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn get_state(State(ctx): State<Arc<PeerContext>>) -> Response {
    match ctx.state.load_state() {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(e) => {
            error!("Failed to load state for peer: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to load state")
        }
    }
}

async fn get_key(State(ctx): State<Arc<PeerContext>>) -> Response {
    match ctx.key.key_bytes() {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(_) => error_response(StatusCode::NOT_FOUND, "no key available"),
    }
}

async fn post_key(State(ctx): State<Arc<PeerContext>>, body: Bytes) -> Response {
    info!("Receiving validator key from peer");

    // A failed decryption must never reach disk.
    let plaintext = match cipher::decrypt(&body, &ctx.secret) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to decrypt received key: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "undecryptable key payload");
        }
    };

    if let Err(e) = ctx.key.install_key(&plaintext) {
        error!("Failed to save received key: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to save key");
    }

    info!("Successfully received and saved validator key");
    StatusCode::OK.into_response()
}

async fn failover_notify(State(ctx): State<Arc<PeerContext>>) -> Response {
    info!("Received failover notification from peer");
    let _guard = ctx.role.transition_lock().await;

    if ctx.role.is_active() {
        // Already holding signing duties; nothing to take over.
        return StatusCode::OK.into_response();
    }

    if !ctx.health.is_healthy() {
        error!("Cannot take over: local validator is unhealthy");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "local validator unhealthy",
        );
    }

    info!("Taking over validator duties");

    if let Err(e) = ctx.state.acquire_lock() {
        error!("Failed to acquire state lock: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to acquire lock");
    }

    // Restart picks up the key received earlier via POST /validator_key.
    if let Some(restarter) = &ctx.restarter {
        if let Err(e) = restarter.restart().await {
            error!("Failed to restart node: {}", e);
            if let Err(release) = ctx.state.release_lock() {
                error!("Failed to release lock after aborted takeover: {}", release);
            }
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to restart node");
        }
    }

    ctx.role.set_active(true);
    info!("Successfully took over as active validator");
    StatusCode::OK.into_response()
}

async fn failback_notify(State(ctx): State<Arc<PeerContext>>) -> Response {
    info!("Received failback notification from peer");
    let _guard = ctx.role.transition_lock().await;

    if ctx.role.is_active() {
        info!("Releasing validator duties for failback");

        // Deactivate, restart, then release, in that order: once we
        // answer OK the peer relies on this node being unable to sign.
        if let Err(e) = ctx.key.deactivate_key() {
            error!("Failed to disable key: {}", e);
        }

        if let Some(restarter) = &ctx.restarter {
            if let Err(e) = restarter.restart().await {
                error!("Failed to restart node: {}", e);
            }
        }

        if let Err(e) = ctx.state.release_lock() {
            error!("Failed to release state lock: {}", e);
        }

        ctx.role.set_active(false);
        info!("Successfully released validator duties");
    }

    StatusCode::OK.into_response()
}

async fn get_health(State(ctx): State<Arc<PeerContext>>) -> Json<PeerHealth> {
    Json(PeerHealth {
        healthy: ctx.health.is_healthy(),
        active: ctx.role.is_active(),
        primary: ctx.role.is_primary(),
        height: ctx.health.last_height(),
    })
}
