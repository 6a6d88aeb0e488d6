//! Webhook routing and idempotent processing.
//!
//! The processor claims the provider's event id in storage before any side
//! effect runs, then dispatches the event to its handler:
//!
//! 1. Claim the event id (loses gracefully to concurrent deliveries)
//! 2. Dispatch to the handler registered for the event type
//! 3. Record the outcome on the claimed row
//!
//! Transient failures release the claim so the provider's retry can
//! reprocess the event; permanent failures keep the row so redelivery of a
//! payload that can never succeed is acknowledged instead of retried
//! forever.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::ports::{ClaimResult, Disposition, WebhookEventRepository, WebhookResult};

use super::errors::WebhookError;
use super::event::{StripeEvent, StripeEventType};

/// Handler for a specific type of webhook event.
///
/// Implementations should be stateless and focus on a single event type.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Returns the event type(s) this handler processes.
    fn handles(&self) -> Vec<StripeEventType>;

    /// Handles the webhook event.
    ///
    /// Returns `Ok(())` on success, `Err(WebhookError::Ignored(_))` if the
    /// event should be acknowledged but not processed, and other `Err`
    /// variants for actual failures.
    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError>;
}

/// Routes verified events to the handler registered for their type.
///
/// Events with no registered handler are ignored, not rejected: the
/// provider retries non-2xx responses indefinitely, so unknown-but-harmless
/// event types must still be acknowledged.
#[derive(Default)]
pub struct WebhookRouter {
    handlers: HashMap<StripeEventType, Arc<dyn WebhookEventHandler>>,
}

impl WebhookRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every event type it declares.
    pub fn register(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        for event_type in handler.handles() {
            self.handlers.insert(event_type, handler.clone());
        }
        self
    }

    /// Dispatch an event to its handler.
    ///
    /// Returns `Err(WebhookError::Ignored)` if no handler is registered for
    /// the event's type.
    pub async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        match self.handlers.get(&event.parsed_type()) {
            Some(handler) => handler.handle(event).await,
            None => Err(WebhookError::Ignored(format!(
                "no handler for event type {}",
                event.event_type
            ))),
        }
    }
}

/// Processes webhook events exactly once.
///
/// Coordinates between the claim store and the router. This is the only
/// entry point the HTTP layer calls after signature verification.
pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    router: WebhookRouter,
}

impl IdempotentWebhookProcessor {
    pub fn new(repository: Arc<dyn WebhookEventRepository>, router: WebhookRouter) -> Self {
        Self { repository, router }
    }

    /// Process a verified webhook event.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - handled or intentionally ignored
    /// - `Ok(WebhookResult::AlreadyProcessed)` - idempotent skip
    /// - `Err(_)` - processing failed; the error's status code tells the
    ///   provider whether to retry
    pub async fn process(&self, event: &StripeEvent) -> Result<WebhookResult, WebhookError> {
        let payload = serde_json::to_value(event)
            .map_err(|e| WebhookError::ParseError(format!("failed to serialize event: {}", e)))?;

        match self
            .repository
            .claim(&event.id, &event.event_type, payload)
            .await?
        {
            ClaimResult::AlreadyProcessed => {
                info!(event_id = %event.id, "duplicate delivery, already processed");
                return Ok(WebhookResult::AlreadyProcessed);
            }
            ClaimResult::InFlight => {
                // The owning delivery may still fail transiently and release
                // its claim; acknowledging here would end redelivery, so the
                // loser answers retryable instead.
                info!(event_id = %event.id, "duplicate delivery while original is in flight");
                return Err(WebhookError::DeliveryInFlight);
            }
            ClaimResult::Claimed => {}
        }

        match self.router.dispatch(event).await {
            Ok(()) => {
                self.repository
                    .complete(&event.id, Disposition::Handled, None)
                    .await?;
                info!(event_id = %event.id, event_type = %event.event_type, "event handled");
                Ok(WebhookResult::Processed)
            }
            Err(WebhookError::Ignored(reason)) => {
                self.repository
                    .complete(&event.id, Disposition::Ignored, Some(reason.clone()))
                    .await?;
                info!(event_id = %event.id, event_type = %event.event_type, %reason, "event ignored");
                Ok(WebhookResult::Processed)
            }
            Err(e) if e.is_retryable() => {
                // Give the claim back so the provider's retry can reprocess.
                if let Err(release_err) = self.repository.release(&event.id).await {
                    warn!(event_id = %event.id, error = %release_err, "failed to release claim");
                }
                Err(e)
            }
            Err(e) => {
                self.repository
                    .complete(&event.id, Disposition::Failed, Some(e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }
}
