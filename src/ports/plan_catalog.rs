//! PlanCatalog port - read-only access to the membership plan catalog.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::membership::MembershipPlan;

/// Looks up membership plans by the payment provider's product identifier.
///
/// # Contract
///
/// Matching is exact on the trimmed product identifier: provider product ids
/// are opaque, case-sensitive tokens, so implementations must not apply
/// case folding. Returns `Ok(None)` when no plan is registered for the
/// reference; that outcome is a permanent condition for the payload, not a
/// transient one.
#[async_trait]
pub trait PlanCatalog: Send + Sync {
    async fn find_by_product_reference(
        &self,
        product_reference: &str,
    ) -> Result<Option<MembershipPlan>, DomainError>;
}
