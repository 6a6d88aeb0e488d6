//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The `webhook_events` table's primary key on `event_id` is the
//! mutual-exclusion point for idempotent processing: `ON CONFLICT DO
//! NOTHING` reports zero affected rows to the losing delivery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ClaimResult, Disposition, WebhookEventRecord, WebhookEventRepository};

/// PostgreSQL implementation of the WebhookEventRepository port.
pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    /// Creates a new PostgresWebhookEventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    received_at: DateTime<Utc>,
    disposition: String,
    detail: Option<String>,
    payload: serde_json::Value,
}

impl From<WebhookEventRow> for WebhookEventRecord {
    fn from(row: WebhookEventRow) -> Self {
        WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            received_at: row.received_at,
            disposition: row.disposition,
            detail: row.detail,
            payload: row.payload,
        }
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn claim(
        &self,
        event_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<ClaimResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type, received_at, disposition, payload)
            VALUES ($1, $2, $3, 'processing', $4)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .bind(Utc::now())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to claim event: {}", e))
        })?;

        if result.rows_affected() == 1 {
            return Ok(ClaimResult::Claimed);
        }

        // Conflict: tell the loser whether the owner has finished. An
        // in-flight owner may still fail and release, so the loser must not
        // acknowledge yet.
        let disposition: Option<String> =
            sqlx::query_scalar("SELECT disposition FROM webhook_events WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to claim event: {}", e),
                    )
                })?;

        match disposition.as_deref() {
            // A missing row means the claim was released between our insert
            // and this lookup; a retry is safe either way.
            Some("processing") | None => Ok(ClaimResult::InFlight),
            Some(_) => Ok(ClaimResult::AlreadyProcessed),
        }
    }

    async fn complete(
        &self,
        event_id: &str,
        disposition: Disposition,
        detail: Option<String>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET disposition = $2, detail = $3
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(disposition.as_str())
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to complete event: {}", e),
            )
        })?;

        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        // Only release claims still mid-flight; completed events stay put
        sqlx::query(
            r#"
            DELETE FROM webhook_events
            WHERE event_id = $1 AND disposition = 'processing'
            "#,
        )
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to release event claim: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, received_at, disposition, detail, payload
            FROM webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find event: {}", e))
        })?;

        Ok(row.map(WebhookEventRecord::from))
    }
}
