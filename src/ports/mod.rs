//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! - `PlanCatalog` - read-only membership plan lookups
//! - `UserRepository` - user lookup-or-create keyed by email
//! - `GrantRepository` - membership grant inserts
//! - `IdentityProvider` - best-effort external auth account creation
//! - `WebhookEventRepository` - webhook idempotency tracking

mod grant_repository;
mod identity_provider;
mod plan_catalog;
mod user_repository;
mod webhook_event_repository;

pub use grant_repository::GrantRepository;
pub use identity_provider::IdentityProvider;
pub use plan_catalog::PlanCatalog;
pub use user_repository::UserRepository;
pub use webhook_event_repository::{
    ClaimResult, Disposition, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
