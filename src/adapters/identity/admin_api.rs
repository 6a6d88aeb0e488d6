//! Admin users API adapter for the IdentityProvider port.
//!
//! Pre-provisions a login account for a purchaser by calling the identity
//! service's admin users endpoint with a service credential. The account is
//! created with the email already confirmed so the buyer can sign in with a
//! password reset instead of a verification round trip.
//!
//! The call is idempotent from the caller's point of view: an
//! already-registered email is reported as success.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::IdentityConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::membership::EmailAddress;
use crate::ports::IdentityProvider;

/// IdentityProvider implementation backed by an HTTP admin users API.
pub struct AdminApiIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    service_credential: SecretString,
}

#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
    email: &'a str,
    email_confirm: bool,
}

impl AdminApiIdentityProvider {
    /// Creates a new adapter from identity configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the HTTP client cannot be constructed.
    pub fn new(config: &IdentityConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DependencyError,
                    format!("Failed to build identity client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_credential: config.service_credential.clone(),
        })
    }

    fn admin_users_url(&self) -> String {
        format!("{}/auth/v1/admin/users", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for AdminApiIdentityProvider {
    async fn ensure_account(&self, email: &EmailAddress) -> Result<(), DomainError> {
        let response = self
            .client
            .post(self.admin_users_url())
            .bearer_auth(self.service_credential.expose_secret())
            .json(&CreateUserRequest {
                email: email.as_str(),
                email_confirm: true,
            })
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DependencyError,
                    format!("Identity API request failed: {}", e),
                )
            })?;

        let status = response.status();

        // 422 means the email is already registered, which satisfies the
        // ensure contract
        if status.is_success() || status.as_u16() == 422 {
            debug!(status = status.as_u16(), "Identity account ensured");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DomainError::new(
            ErrorCode::DependencyError,
            format!("Identity API returned {}: {}", status, body),
        ))
    }
}
