//! WebhookEventRepository port - idempotency tracking for provider webhooks.
//!
//! The provider may deliver the same webhook multiple times: network
//! timeouts, a 5xx from our endpoint, or a lost acknowledgement all trigger
//! redelivery. Processing is made idempotent by claiming the provider's
//! unique event id in storage before any side effect runs. The claim insert
//! is the mutual-exclusion point: implementations must back it with a
//! PRIMARY KEY or UNIQUE constraint on the event id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Final disposition of a processed webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A handler processed the event successfully.
    Handled,
    /// No handler wanted the event; acknowledged and skipped.
    Ignored,
    /// Processing failed permanently; redelivery will not help.
    Failed,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Handled => "handled",
            Disposition::Ignored => "ignored",
            Disposition::Failed => "failed",
        }
    }
}

/// Record of a claimed or processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Provider event ID (evt_xxx format).
    pub event_id: String,

    /// Provider event type (e.g., "checkout.session.completed").
    pub event_type: String,

    /// When the event was first claimed.
    pub received_at: DateTime<Utc>,

    /// "processing" while claimed, then "handled", "ignored", or "failed".
    pub disposition: String,

    /// Ignore reason or failure message.
    pub detail: Option<String>,

    /// Original event payload, kept for debugging and audit.
    pub payload: serde_json::Value,
}

/// Result of attempting to claim an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This invocation owns the event; proceed with processing.
    Claimed,
    /// Another delivery claimed the event and has not finished yet.
    ///
    /// The loser must not acknowledge: if the in-flight owner later fails
    /// transiently and releases the claim, a 2xx already sent here would
    /// have stopped the provider from ever redelivering.
    InFlight,
    /// Another delivery already finished processing this event.
    AlreadyProcessed,
}

/// Result of webhook processing, as seen by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResult {
    /// Event was processed (handled or intentionally ignored).
    Processed,
    /// Event was already processed by an earlier delivery.
    AlreadyProcessed,
}

/// Port for the processed-events table.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Atomically claim an event id before taking any action.
    ///
    /// Uses `INSERT ... ON CONFLICT DO NOTHING` semantics. The losing side
    /// of a concurrent race gets `ClaimResult::InFlight` while the owner is
    /// still processing, or `ClaimResult::AlreadyProcessed` once a final
    /// disposition has been recorded.
    async fn claim(
        &self,
        event_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<ClaimResult, DomainError>;

    /// Record the final disposition on a claimed event.
    async fn complete(
        &self,
        event_id: &str,
        disposition: Disposition,
        detail: Option<String>,
    ) -> Result<(), DomainError>;

    /// Release a claim after a transient failure so redelivery can retry.
    async fn release(&self, event_id: &str) -> Result<(), DomainError>;

    /// Find a previously claimed event by its provider event ID.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;
}
