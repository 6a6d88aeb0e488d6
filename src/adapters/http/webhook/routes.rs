//! Axum router configuration for the webhook endpoint.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{handle_payment_webhook, WebhookAppState};

/// Create the webhook API router.
///
/// # Routes
///
/// - `POST /api/webhook` - provider webhook intake (signature verified)
/// - `GET /health` - liveness probe
///
/// The webhook route accepts POST only; axum answers other methods with
/// 405 Method Not Allowed.
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new()
        .route("/api/webhook", post(handle_payment_webhook))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}
