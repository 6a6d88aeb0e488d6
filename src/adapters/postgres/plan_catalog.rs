//! PostgreSQL implementation of PlanCatalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::membership::MembershipPlan;
use crate::ports::PlanCatalog;

/// Reads the membership plan catalog from PostgreSQL.
pub struct PostgresPlanCatalog {
    pool: PgPool,
}

impl PostgresPlanCatalog {
    /// Creates a new PostgresPlanCatalog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    provider_product_id: String,
    name: String,
    weekly_hours: i32,
}

impl From<PlanRow> for MembershipPlan {
    fn from(row: PlanRow) -> Self {
        MembershipPlan {
            id: row.id,
            provider_product_id: row.provider_product_id,
            name: row.name,
            weekly_hours: row.weekly_hours,
        }
    }
}

#[async_trait]
impl PlanCatalog for PostgresPlanCatalog {
    async fn find_by_product_reference(
        &self,
        product_reference: &str,
    ) -> Result<Option<MembershipPlan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, provider_product_id, name, weekly_hours
            FROM membership_plans
            WHERE provider_product_id = $1
            "#,
        )
        .bind(product_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find plan: {}", e))
        })?;

        Ok(row.map(MembershipPlan::from))
    }
}
