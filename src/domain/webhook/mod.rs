//! Webhook domain module.
//!
//! Covers the intake path for provider webhooks: signature verification,
//! typed events, routing, and idempotent processing.

mod errors;
mod event;
mod processor;
mod verifier;

pub use errors::WebhookError;
pub use event::{StripeEvent, StripeEventData, StripeEventType};
pub use processor::{IdempotentWebhookProcessor, WebhookEventHandler, WebhookRouter};
pub use verifier::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use event::StripeEventBuilder;
#[cfg(test)]
pub use verifier::compute_test_signature;
