//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::membership::{EmailAddress, Role, User};
use crate::ports::UserRepository;

/// PostgreSQL implementation of the UserRepository port.
///
/// Concurrency safety for find-or-create comes from the UNIQUE constraint
/// on `users.email`: the insert uses `ON CONFLICT DO NOTHING` and the loser
/// of a race re-fetches the winner's row.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find user: {}", e))
        })?;

        row.map(User::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::parse(&row.email).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored email: {}", e))
        })?;
        let role = Role::parse(&row.role).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid role value: {}", row.role),
            )
        })?;

        Ok(User {
            id: row.id,
            email,
            role,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_or_create(&self, email: &EmailAddress) -> Result<User, DomainError> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing);
        }

        let candidate = User::new(email.clone());

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, email, role, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.email.as_str())
        .bind(candidate.role.as_str())
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to create user: {}", e))
        })?;

        if inserted.rows_affected() == 1 {
            return Ok(candidate);
        }

        // Lost the insert race; the winner's row must exist now
        self.find_by_email(email).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("User vanished after insert conflict: {}", email),
            )
        })
    }
}
