//! GrantRepository port - membership grant persistence.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::membership::MembershipGrant;

/// Inserts membership grants.
///
/// Deduplication is not this port's job: the idempotent webhook processor
/// guarantees at most one insert per provider event id, so an insert here is
/// always intentional. Grants are never mutated or deleted by this flow.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    async fn insert(&self, grant: &MembershipGrant) -> Result<(), DomainError>;
}
