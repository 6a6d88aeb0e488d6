//! HTTP handler for the payment webhook endpoint.
//!
//! The handler owns the request lifecycle: read the raw body bytes, verify
//! the provider signature against those exact bytes, then run the idempotent
//! processor under a request-scoped deadline. The response status is the
//! only channel back to the provider, so every branch maps through
//! `WebhookError::status_code`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::webhook::{IdempotentWebhookProcessor, WebhookError, WebhookVerifier};
use crate::ports::WebhookResult;

/// Shared application state for the webhook endpoint.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct WebhookAppState {
    pub verifier: Arc<WebhookVerifier>,
    pub processor: Arc<IdempotentWebhookProcessor>,
    /// Deadline applied to processing after signature verification.
    pub request_timeout: Duration,
}

/// Acknowledgement body returned to the provider on success.
#[derive(Debug, Serialize)]
struct ReceivedResponse {
    received: bool,
}

/// Error body with a stable machine-readable message.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// POST /api/webhook - receive and process a provider webhook delivery.
pub async fn handle_payment_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let Some(signature) = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        warn!("webhook rejected: missing signature header");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing Stripe-Signature header".to_string(),
        );
    };

    let event = match state.verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "webhook rejected: verification failed");
            return error_response(e.status_code(), e.to_string());
        }
    };

    let result = match tokio::time::timeout(state.request_timeout, state.processor.process(&event))
        .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(event_id = %event.id, "webhook processing deadline exceeded");
            Err(WebhookError::DeadlineExceeded)
        }
    };

    match result {
        Ok(WebhookResult::Processed) | Ok(WebhookResult::AlreadyProcessed) => {
            (StatusCode::OK, Json(ReceivedResponse { received: true })).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            if status == StatusCode::OK {
                // Ignored surfaces as an error variant but acknowledges
                return (StatusCode::OK, Json(ReceivedResponse { received: true }))
                    .into_response();
            }
            info!(event_id = %event.id, error = %e, retryable = e.is_retryable(), "webhook processing failed");
            error_response(status, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}
