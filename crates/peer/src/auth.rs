//! HMAC authentication middleware for mutating peer requests.

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use syncguard_crypto::auth;
use tracing::warn;

/// Header carrying the hex HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Header carrying the unix-seconds timestamp covered by the signature.
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";

/// Shared state for the signature middleware.
#[derive(Clone)]
pub struct AuthState {
    pub secret: String,
    pub max_clock_skew: Duration,
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Reject mutating requests without a fresh, valid signature. Read-only
/// requests pass through untouched.
pub async fn require_signature(
    State(auth_state): State<Arc<AuthState>>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() != Method::POST {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();

    let timestamp = req
        .headers()
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let Some(timestamp) = timestamp else {
        warn!("Rejected {}: missing or malformed {}", path, TIMESTAMP_HEADER);
        return forbidden("missing or malformed timestamp");
    };

    if unix_now().abs_diff(timestamp) > auth_state.max_clock_skew.as_secs() {
        warn!("Rejected {}: timestamp outside accepted window", path);
        return forbidden("stale timestamp");
    }

    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let Some(signature) = signature else {
        warn!("Rejected {}: missing {}", path, SIGNATURE_HEADER);
        return forbidden("missing signature");
    };

    let message = auth::canonical_message(req.method().as_str(), &path, timestamp);
    if !auth::verify(&message, signature, &auth_state.secret) {
        warn!("Rejected {}: invalid signature", path);
        return forbidden("invalid signature");
    }

    next.run(req).await
}

fn forbidden(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
