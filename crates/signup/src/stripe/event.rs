//! Serde models for the slice of the Stripe event envelope this service
//! consumes. Unknown fields are ignored.

use std::collections::HashMap;

use serde::Deserialize;

/// Event type for a completed hosted checkout.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// A webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event id (`evt_...`).
    pub id: String,
    /// Event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: EventData,
}

/// The `data` member of an event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The API object the event describes. Kept raw here; the handler
    /// deserializes it once it has branched on the event type.
    pub object: serde_json::Value,
}

/// A checkout session, as embedded in `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session id (`cs_...`).
    pub id: String,
    /// Customer id (`cus_...`), present once the session completes.
    #[serde(default)]
    pub customer: Option<String>,
    /// Subscription id (`sub_...`) for subscription-mode sessions.
    #[serde(default)]
    pub subscription: Option<String>,
    /// Contact details Stripe collected on the hosted page.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    /// Metadata attached when the session was created.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Customer contact details on a checkout session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// A postal address as Stripe represents it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completed_event() {
        let payload = r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "object": "checkout.session",
                    "customer": "cus_123",
                    "subscription": "sub_456",
                    "customer_details": {
                        "email": "resident@example.com",
                        "name": "Jordan Resident",
                        "address": {"line1": "12 Birch St", "postal_code": "80501"}
                    },
                    "metadata": {"signup": "{}"}
                }
            }
        }"#;

        let event: Event = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, CHECKOUT_SESSION_COMPLETED);

        let session: CheckoutSession = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.customer.as_deref(), Some("cus_123"));
        assert_eq!(session.subscription.as_deref(), Some("sub_456"));
        let details = session.customer_details.unwrap();
        assert_eq!(details.email.as_deref(), Some("resident@example.com"));
        assert_eq!(
            details.address.unwrap().postal_code.as_deref(),
            Some("80501")
        );
    }

    #[test]
    fn test_parse_minimal_session() {
        let session: CheckoutSession =
            serde_json::from_str(r#"{"id": "cs_test_2"}"#).unwrap();
        assert!(session.customer.is_none());
        assert!(session.metadata.is_empty());
    }
}
