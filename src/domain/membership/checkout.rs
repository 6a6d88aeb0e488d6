//! Extraction of purchase details from a checkout-completion event.

use serde::Deserialize;

use crate::domain::webhook::{StripeEvent, WebhookError};

use super::email::EmailAddress;

/// Wire shape of the checkout session object inside the event payload.
///
/// Only the fields this flow needs; the rest of the session is ignored.
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    #[serde(default)]
    customer_details: Option<CustomerDetails>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    client_reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

/// The purchase details a checkout-completion event reconciles from.
///
/// Transient, scoped to one webhook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub customer_email: EmailAddress,
    pub product_reference: String,
}

impl CheckoutDetails {
    /// Extracts purchase details from a verified checkout-completion event.
    ///
    /// The product reference is read from `metadata.product_id` first, with
    /// `client_reference_id` as the documented fallback. Both the email and
    /// the product reference are required and must be non-empty after
    /// trimming; a missing field is a permanent client error, never an
    /// ignorable one.
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let session: CheckoutSessionObject =
            serde_json::from_value(event.data.object.clone())
                .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let raw_email = session
            .customer_details
            .and_then(|d| d.email)
            .ok_or(WebhookError::MissingField("customer_details.email"))?;
        let customer_email = EmailAddress::parse(&raw_email)
            .map_err(|_| WebhookError::MissingField("customer_details.email"))?;

        let product_reference = session
            .metadata
            .as_ref()
            .and_then(|m| m.get("product_id"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                session
                    .client_reference_id
                    .as_deref()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .ok_or(WebhookError::MissingField("metadata.product_id"))?;

        Ok(Self {
            customer_email,
            product_reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::StripeEventBuilder;
    use serde_json::json;

    fn event_with_object(object: serde_json::Value) -> StripeEvent {
        StripeEventBuilder::new().object(object).build()
    }

    #[test]
    fn extracts_email_and_metadata_product_id() {
        let event = event_with_object(json!({
            "customer_details": {"email": "a@example.com"},
            "metadata": {"product_id": "prod_123"}
        }));

        let details = CheckoutDetails::from_event(&event).unwrap();

        assert_eq!(details.customer_email.as_str(), "a@example.com");
        assert_eq!(details.product_reference, "prod_123");
    }

    #[test]
    fn normalizes_email_case_and_whitespace() {
        let event = event_with_object(json!({
            "customer_details": {"email": "  A@Example.COM "},
            "metadata": {"product_id": "prod_123"}
        }));

        let details = CheckoutDetails::from_event(&event).unwrap();

        assert_eq!(details.customer_email.as_str(), "a@example.com");
    }

    #[test]
    fn trims_product_reference() {
        let event = event_with_object(json!({
            "customer_details": {"email": "a@example.com"},
            "metadata": {"product_id": "  prod_123  "}
        }));

        let details = CheckoutDetails::from_event(&event).unwrap();

        assert_eq!(details.product_reference, "prod_123");
    }

    #[test]
    fn falls_back_to_client_reference_id() {
        let event = event_with_object(json!({
            "customer_details": {"email": "a@example.com"},
            "client_reference_id": "prod_fallback"
        }));

        let details = CheckoutDetails::from_event(&event).unwrap();

        assert_eq!(details.product_reference, "prod_fallback");
    }

    #[test]
    fn metadata_wins_over_client_reference_id() {
        let event = event_with_object(json!({
            "customer_details": {"email": "a@example.com"},
            "metadata": {"product_id": "prod_meta"},
            "client_reference_id": "prod_client"
        }));

        let details = CheckoutDetails::from_event(&event).unwrap();

        assert_eq!(details.product_reference, "prod_meta");
    }

    #[test]
    fn empty_metadata_value_falls_back() {
        let event = event_with_object(json!({
            "customer_details": {"email": "a@example.com"},
            "metadata": {"product_id": "   "},
            "client_reference_id": "prod_client"
        }));

        let details = CheckoutDetails::from_event(&event).unwrap();

        assert_eq!(details.product_reference, "prod_client");
    }

    #[test]
    fn missing_email_fails() {
        let event = event_with_object(json!({
            "metadata": {"product_id": "prod_123"}
        }));

        let result = CheckoutDetails::from_event(&event);

        assert!(matches!(
            result,
            Err(WebhookError::MissingField("customer_details.email"))
        ));
    }

    #[test]
    fn malformed_email_fails() {
        let event = event_with_object(json!({
            "customer_details": {"email": "nonsense"},
            "metadata": {"product_id": "prod_123"}
        }));

        assert!(CheckoutDetails::from_event(&event).is_err());
    }

    #[test]
    fn missing_product_reference_fails() {
        let event = event_with_object(json!({
            "customer_details": {"email": "a@example.com"}
        }));

        let result = CheckoutDetails::from_event(&event);

        assert!(matches!(
            result,
            Err(WebhookError::MissingField("metadata.product_id"))
        ));
    }

    #[test]
    fn empty_object_fails_on_email_first() {
        let event = event_with_object(json!({}));

        assert!(matches!(
            CheckoutDetails::from_event(&event),
            Err(WebhookError::MissingField("customer_details.email"))
        ));
    }
}
