//! Webhook error types.
//!
//! Defines all error conditions that can occur during webhook intake, with
//! HTTP status code mapping and retryability semantics. The 4xx/5xx split is
//! the load-bearing contract of the whole service: a permanent failure
//! reported as retryable causes redelivery storms, and a transient failure
//! reported as permanent causes silent data loss.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing or empty in the webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Referenced membership plan does not exist in the catalog.
    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// A concurrent delivery of the same event is still being processed.
    #[error("Event delivery already in flight")]
    DeliveryInFlight,

    /// Data store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Processing exceeded the request-scoped deadline.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl WebhookError {
    /// Returns true if the sender should retry delivering this webhook.
    ///
    /// Retryable errors indicate temporary failures that may succeed on
    /// subsequent attempts. Plan-not-found is permanent for the payload:
    /// redelivery cannot help until the catalog changes, so the sender must
    /// not be told to retry. An in-flight duplicate is retryable: the owning
    /// delivery may yet fail transiently and release the claim, and an
    /// acknowledgement here would stop the sender from ever redelivering.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::DeliveryInFlight
                | WebhookError::Database(_)
                | WebhookError::DeadlineExceeded
        )
    }

    /// Maps the error to the HTTP status code for the webhook response.
    ///
    /// Status codes determine the sender's retry behavior:
    /// - 2xx: event acknowledged, no retry
    /// - 4xx: permanent failure, redelivery will not help
    /// - 5xx: transient failure, sender retries later
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::PlanNotFound(_) => StatusCode::NOT_FOUND,

            // Ignored events are acknowledged as success to stop redelivery
            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::DeliveryInFlight
            | WebhookError::Database(_)
            | WebhookError::DeadlineExceeded => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
