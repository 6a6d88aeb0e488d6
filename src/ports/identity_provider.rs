//! IdentityProvider port - external authentication account provisioning.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::membership::EmailAddress;

/// Ensures an external authentication account exists for an email.
///
/// # Contract
///
/// Idempotent: an already-existing account is success, not a conflict.
/// Callers treat failures as non-fatal - the auth account and the
/// membership record are independent concerns, and losing one must not
/// block the other.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn ensure_account(&self, email: &EmailAddress) -> Result<(), DomainError>;
}
