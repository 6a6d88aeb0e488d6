//! HTTP adapter for the payment webhook endpoint.

mod handlers;
mod routes;

pub use handlers::{handle_payment_webhook, WebhookAppState};
pub use routes::webhook_router;
