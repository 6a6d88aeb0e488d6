//! Webhook intake service entry point.
//!
//! Wires configuration, the PostgreSQL pool, and the adapters into the
//! idempotent webhook processor, then serves the HTTP endpoint until
//! shutdown is requested.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tutoria_webhooks::adapters::http::{webhook_router, WebhookAppState};
use tutoria_webhooks::adapters::identity::AdminApiIdentityProvider;
use tutoria_webhooks::adapters::postgres::{
    PostgresGrantRepository, PostgresPlanCatalog, PostgresUserRepository,
    PostgresWebhookEventRepository,
};
use tutoria_webhooks::application::handlers::membership::{
    CheckoutCompletedHandler, ReconcilePurchaseHandler,
};
use tutoria_webhooks::config::AppConfig;
use tutoria_webhooks::domain::webhook::{
    IdempotentWebhookProcessor, WebhookRouter, WebhookVerifier,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "starting webhook intake service"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let plan_catalog = Arc::new(PostgresPlanCatalog::new(pool.clone()));
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let grant_repository = Arc::new(PostgresGrantRepository::new(pool.clone()));
    let event_repository = Arc::new(PostgresWebhookEventRepository::new(pool.clone()));
    let identity_provider = Arc::new(AdminApiIdentityProvider::new(&config.identity)?);

    let reconciler = Arc::new(ReconcilePurchaseHandler::new(
        plan_catalog,
        user_repository,
        grant_repository,
        identity_provider,
    ));

    let router = WebhookRouter::new().register(Arc::new(CheckoutCompletedHandler::new(reconciler)));
    let processor = Arc::new(IdempotentWebhookProcessor::new(event_repository, router));

    let state = WebhookAppState {
        verifier: Arc::new(WebhookVerifier::new(
            config.payment.webhook_signing_secret.expose_secret().as_str(),
        )),
        processor,
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    };

    let app = webhook_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.server.socket_addr();
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("shutdown signal received");
}
