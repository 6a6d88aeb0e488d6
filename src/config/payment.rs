//! Payment provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration
///
/// Secrets are wrapped in [`SecretString`] so they never appear in Debug
/// output or logs. They are only ever read from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Provider API key (`sk_...`)
    pub secret_key: SecretString,

    /// Webhook signing secret (`whsec_...`)
    pub webhook_signing_secret: SecretString,
}

impl PaymentConfig {
    /// Check if using provider test mode
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using provider live mode
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"));
        }
        if self.webhook_signing_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__WEBHOOK_SIGNING_SECRET",
            ));
        }

        // Verify key prefixes for safety
        if !self.secret_key.expose_secret().starts_with("sk_") {
            return Err(ValidationError::InvalidPaymentKey);
        }
        if !self
            .webhook_signing_secret
            .expose_secret()
            .starts_with("whsec_")
        {
            return Err(ValidationError::InvalidWebhookSigningSecret);
        }

        Ok(())
    }
}
