//! PostgreSQL adapter implementations.

mod grant_repository;
mod plan_catalog;
mod user_repository;
mod webhook_event_repository;

pub use grant_repository::PostgresGrantRepository;
pub use plan_catalog::PostgresPlanCatalog;
pub use user_repository::PostgresUserRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
