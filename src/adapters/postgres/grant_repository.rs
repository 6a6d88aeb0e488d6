//! PostgreSQL implementation of GrantRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::membership::MembershipGrant;
use crate::ports::GrantRepository;

/// PostgreSQL implementation of the GrantRepository port.
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a new PostgresGrantRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn insert(&self, grant: &MembershipGrant) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO membership_grants (id, user_id, plan_id, available_hours, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(grant.id)
        .bind(grant.user_id)
        .bind(grant.plan_id)
        .bind(grant.available_hours)
        .bind(grant.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to insert grant: {}", e))
        })?;

        Ok(())
    }
}
