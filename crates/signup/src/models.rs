//! Domain models persisted by the signup service, plus the signup snapshot
//! that travels through the payment processor's metadata.

use chrono::{DateTime, Utc};
use curbside_core::{
    Email, Frequency, ProfileId, ScheduleId, SelectionState, ServiceType, SubscriptionId, Weekday,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer profile, keyed by the payment processor's customer id.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: ProfileId,
    pub stripe_customer_id: String,
    pub email: Option<Email>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: SignupAddress,
    pub reminders_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pickup schedule row: one per enabled service per profile.
#[derive(Debug, Clone)]
pub struct ServiceSchedule {
    pub id: ScheduleId,
    pub profile_id: ProfileId,
    pub service: ServiceType,
    pub pickup_day: Weekday,
    pub frequency: Frequency,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

/// A subscription row: one per enabled service per profile.
#[derive(Debug, Clone)]
pub struct ServiceSubscription {
    pub id: SubscriptionId,
    pub profile_id: ProfileId,
    pub service: ServiceType,
    pub stripe_subscription_id: Option<String>,
    pub checkout_session_id: String,
    pub monthly_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Street address collected by the signup form.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SignupAddress {
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

/// The signup snapshot embedded in the checkout session's metadata.
///
/// The checkout handoff serializes this under the `signup` metadata key;
/// the webhook deserializes the same shape back out when the payment
/// completes. Field names are part of the wire contract with in-flight
/// checkout sessions - change them only with a migration window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupSnapshot {
    /// The customer's service selection.
    pub selection: SelectionState,
    /// Contact email.
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: SignupAddress,
    /// Whether the customer opted into pickup-day reminders.
    #[serde(default)]
    pub reminders: bool,
}

/// The key under which [`SignupSnapshot`] is stored in session metadata.
pub const SIGNUP_METADATA_KEY: &str = "signup";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = SignupSnapshot {
            selection: SelectionState::new(),
            email: "resident@example.com".to_string(),
            name: Some("Jordan Resident".to_string()),
            phone: None,
            address: SignupAddress {
                line1: Some("12 Birch St".to_string()),
                postal_code: Some("80501".to_string()),
                ..SignupAddress::default()
            },
            reminders: true,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SignupSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_snapshot_tolerates_missing_optional_fields() {
        let parsed: SignupSnapshot =
            serde_json::from_str(r#"{"selection":{},"email":"resident@example.com"}"#).unwrap();
        assert_eq!(parsed.email, "resident@example.com");
        assert!(!parsed.reminders);
        assert_eq!(parsed.address, SignupAddress::default());
    }
}
