//! UserRepository port - user lookup-or-create keyed by email.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::membership::{EmailAddress, User};

/// Lookup-or-create for platform users.
///
/// # Contract
///
/// `find_or_create` is one logical unit: concurrent calls for the same new
/// email must never produce two rows. Implementations rely on a storage-layer
/// UNIQUE constraint on email and treat an insert conflict as "someone else
/// created it first" - re-fetch and return that row rather than erroring.
/// New users are created with the default purchaser role.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_or_create(&self, email: &EmailAddress) -> Result<User, DomainError>;
}
