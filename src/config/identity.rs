//! Identity provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Identity provider configuration
///
/// Points at the admin users API used to pre-provision login accounts
/// after a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity service
    pub base_url: String,

    /// Service credential authorizing admin API calls
    pub service_credential: SecretString,

    /// Request timeout for identity API calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl IdentityConfig {
    /// Validate identity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidIdentityBaseUrl);
        }
        if self.service_credential.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "IDENTITY__SERVICE_CREDENTIAL",
            ));
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, credential: &str) -> IdentityConfig {
        IdentityConfig {
            base_url: base_url.to_string(),
            service_credential: credential.to_string().into(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        let config = config("https://project.example.co", "service-role-key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_base_url() {
        let config = config("", "service-role-key");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let config = config("ftp://project.example.co", "service-role-key");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_credential() {
        let config = config("https://project.example.co", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = config("https://project.example.co", "service-role-key");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("service-role-key"));
    }
}
