//! Email address value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Normalized email address.
///
/// One canonical normalization policy applies everywhere an email enters the
/// system: trim surrounding whitespace and lowercase. User lookups are
/// therefore case-insensitive by construction, with no per-call-site policy
/// to get wrong.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and normalizes an email address.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for empty input or input without an `@`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "email cannot be empty",
            ));
        }
        if !normalized.contains('@') {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                format!("invalid email address: {}", normalized),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
