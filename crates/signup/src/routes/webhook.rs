//! Payment-processor webhook: provisions customer records after payment.
//!
//! One state machine per delivery:
//! verify signature -> parse envelope -> extract signup details (falling
//! back to the session's raw customer fields if the metadata is malformed)
//! -> upsert profile -> upsert schedules -> upsert subscriptions ->
//! best-effort notify.
//!
//! Stripe may deliver the same event more than once and in no particular
//! order; every write is an idempotent upsert, so a re-delivery rewrites the
//! same rows. An upsert failure after the profile step surfaces as a 500 so
//! Stripe redelivers - that is the only retry mechanism.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use chrono::Utc;
use curbside_core::{Email, SelectionState};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;

use crate::db::{
    ProfileRepository, ProfileUpsert, ScheduleRepository, ScheduleUpsert, SubscriptionRepository,
    SubscriptionUpsert,
};
use crate::error::{AppError, Result};
use crate::models::{SIGNUP_METADATA_KEY, SignupAddress, SignupSnapshot};
use crate::state::AppState;
use crate::stripe::webhook::{SIGNATURE_HEADER, verify_signature};
use crate::stripe::{CHECKOUT_SESSION_COMPLETED, CheckoutSession, Event};

/// Acknowledgement body returned to the processor.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub success: bool,
}

/// POST /api/webhook - receive a signed processor event.
#[instrument(skip(state, headers, body))]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::SignatureVerification)?;

    let secret = state.config().stripe.webhook_secret.expose_secret();
    if let Err(reason) = verify_signature(&body, signature, secret, Utc::now().timestamp()) {
        tracing::warn!(%reason, "Webhook signature rejected");
        return Err(AppError::SignatureVerification);
    }

    let event: Event = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid event payload: {e}")))?;

    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        tracing::debug!(event_type = %event.event_type, "Ignoring event type");
        return Ok(Json(WebhookAck {
            received: true,
            success: true,
        }));
    }

    let session: CheckoutSession = serde_json::from_value(event.data.object)
        .map_err(|e| AppError::BadRequest(format!("invalid checkout session: {e}")))?;

    tracing::info!(event_id = %event.id, session_id = %session.id, "Reconciling completed checkout");
    reconcile(&state, &session).await?;

    Ok(Json(WebhookAck {
        received: true,
        success: true,
    }))
}

/// Provision profile, schedules, and subscriptions for a completed session.
async fn reconcile(state: &AppState, session: &CheckoutSession) -> Result<()> {
    let customer_id = session
        .customer
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("completed session has no customer".to_string()))?;

    let snapshot = extract_signup(session);

    let email = match Email::parse(&snapshot.email) {
        Ok(email) => Some(email),
        Err(e) => {
            tracing::warn!(error = %e, "Session has no usable email; provisioning without one");
            None
        }
    };

    let profiles = ProfileRepository::new(state.pool());
    let profile = profiles
        .upsert(&ProfileUpsert {
            stripe_customer_id: customer_id.to_owned(),
            email: email.clone(),
            name: snapshot.name.clone(),
            phone: snapshot.phone.clone(),
            address: snapshot.address.clone(),
            reminders_enabled: snapshot.reminders,
        })
        .await?;

    let schedules = ScheduleRepository::new(state.pool());
    let subscriptions = SubscriptionRepository::new(state.pool());
    let pricing = state.pricing();

    for service in snapshot.selection.enabled_services() {
        let config = snapshot.selection.get(service);
        let (Some(pickup_day), Some(frequency)) = (config.day, config.frequency) else {
            // validate() has already run; this only trips on a snapshot
            // shape no current page produces.
            tracing::warn!(%service, "Enabled service missing day or frequency; skipping");
            continue;
        };

        schedules
            .upsert(&ScheduleUpsert {
                profile_id: profile.id,
                service,
                pickup_day,
                frequency,
                quantity: config.quantity,
            })
            .await?;

        subscriptions
            .upsert(&SubscriptionUpsert {
                profile_id: profile.id,
                service,
                stripe_subscription_id: session.subscription.clone(),
                checkout_session_id: session.id.clone(),
                monthly_price: pricing.price_for(&snapshot.selection, service),
            })
            .await?;
    }

    // Notification failure is logged and swallowed: the customer has paid
    // and the records exist, so this must not trigger a 500/redelivery.
    if let (Some(notify), Some(email)) = (state.notify(), email.as_ref()) {
        let quote = pricing.quote(&snapshot.selection);
        if let Err(e) = notify
            .send_welcome(email.as_str(), snapshot.name.as_deref(), &quote)
            .await
        {
            tracing::warn!(error = %e, "Welcome notification failed");
        }
    }

    tracing::info!(
        profile_id = %profile.id,
        services = snapshot.selection.enabled_services().count(),
        "Checkout reconciled"
    );

    Ok(())
}

/// Extract the signup snapshot from session metadata, falling back to the
/// session's raw customer fields when the metadata is missing or malformed.
///
/// The fallback keeps the profile provisioning alive (identity and address
/// come straight from Stripe); the selection is empty, so no schedule or
/// subscription rows are written for that delivery.
fn extract_signup(session: &CheckoutSession) -> SignupSnapshot {
    if let Some(raw) = session.metadata.get(SIGNUP_METADATA_KEY) {
        match serde_json::from_str::<SignupSnapshot>(raw) {
            Ok(snapshot) => {
                if snapshot.selection.validate().is_ok() {
                    return snapshot;
                }
                tracing::warn!(session_id = %session.id, "Signup metadata has an invalid selection; using customer fields");
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id, error = %e, "Malformed signup metadata; using customer fields");
            }
        }
    } else {
        tracing::warn!(session_id = %session.id, "Session has no signup metadata; using customer fields");
    }

    fallback_snapshot(session)
}

fn fallback_snapshot(session: &CheckoutSession) -> SignupSnapshot {
    let details = session.customer_details.clone().unwrap_or_default();
    let address = details.address.unwrap_or_default();

    SignupSnapshot {
        selection: SelectionState::new(),
        email: details.email.unwrap_or_default(),
        name: details.name,
        phone: details.phone,
        address: SignupAddress {
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
        },
        reminders: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use curbside_core::{Frequency, ServiceType, Weekday};

    fn session_with_metadata(signup: Option<&str>) -> CheckoutSession {
        let mut value = serde_json::json!({
            "id": "cs_test_1",
            "customer": "cus_123",
            "subscription": "sub_456",
            "customer_details": {
                "email": "fallback@example.com",
                "name": "Fallback Name",
                "phone": "+13035550100",
                "address": {"line1": "12 Birch St", "city": "Longmont", "state": "CO", "postal_code": "80501"}
            }
        });
        if let Some(raw) = signup {
            value["metadata"] = serde_json::json!({ "signup": raw });
        }
        serde_json::from_value(value).unwrap()
    }

    fn valid_snapshot_json() -> String {
        let mut selection = SelectionState::new();
        selection.enable(ServiceType::Trash);
        selection.set_day(ServiceType::Trash, Weekday::Monday);
        selection.set_frequency(ServiceType::Trash, Frequency::Weekly);
        selection.set_quantity(ServiceType::Trash, 2);

        serde_json::to_string(&SignupSnapshot {
            selection,
            email: "resident@example.com".to_string(),
            name: Some("Jordan Resident".to_string()),
            phone: None,
            address: SignupAddress {
                postal_code: Some("80501".to_string()),
                ..SignupAddress::default()
            },
            reminders: true,
        })
        .unwrap()
    }

    #[test]
    fn test_extract_signup_uses_metadata() {
        let raw = valid_snapshot_json();
        let session = session_with_metadata(Some(&raw));

        let snapshot = extract_signup(&session);
        assert_eq!(snapshot.email, "resident@example.com");
        assert!(snapshot.reminders);
        assert!(snapshot.selection.get(ServiceType::Trash).enabled);
        assert_eq!(snapshot.selection.get(ServiceType::Trash).quantity, 2);
    }

    #[test]
    fn test_malformed_metadata_falls_back_to_customer_fields() {
        let session = session_with_metadata(Some("{not json"));

        let snapshot = extract_signup(&session);
        assert_eq!(snapshot.email, "fallback@example.com");
        assert_eq!(snapshot.name.as_deref(), Some("Fallback Name"));
        assert_eq!(snapshot.address.postal_code.as_deref(), Some("80501"));
        assert!(snapshot.selection.is_empty());
        assert!(!snapshot.reminders);
    }

    #[test]
    fn test_missing_metadata_falls_back_to_customer_fields() {
        let session = session_with_metadata(None);

        let snapshot = extract_signup(&session);
        assert_eq!(snapshot.email, "fallback@example.com");
        assert!(snapshot.selection.is_empty());
    }

    #[test]
    fn test_tampered_selection_falls_back() {
        // Disabled service carrying residue fails validation.
        let raw = r#"{"selection":{"trash":{"enabled":false,"quantity":3}},"email":"resident@example.com"}"#;
        let session = session_with_metadata(Some(raw));

        let snapshot = extract_signup(&session);
        assert_eq!(snapshot.email, "fallback@example.com");
        assert!(snapshot.selection.is_empty());
    }
}
