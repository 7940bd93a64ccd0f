//! Checkout handoff.
//!
//! Turns the form's persisted signup snapshot into a hosted checkout
//! session. The snapshot rides along in the session's metadata so the
//! webhook can provision records from exactly what the customer configured,
//! and the server recomputes the quote so the displayed price and the
//! charged price come from the same engine.

use axum::{Json, extract::State};
use curbside_core::{Email, Quote, build_line_items};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::area::Zip;
use crate::error::{AppError, Result};
use crate::models::{SignupAddress, SignupSnapshot};
use crate::state::AppState;
use crate::stripe::client::CheckoutSessionParams;

/// Checkout request body: the signup form's full state.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// The customer's service selection.
    pub selection: curbside_core::SelectionState,
    /// Contact email.
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Pickup address. The ZIP must be inside the service area.
    pub address: SignupAddress,
    /// Whether the customer opted into pickup-day reminders.
    #[serde(default)]
    pub reminders: bool,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted checkout URL to redirect the customer to.
    pub url: String,
    /// The created session id.
    pub session_id: String,
    /// The server-computed quote, for display next to the redirect.
    pub quote: Quote,
}

/// POST /api/checkout - create a hosted checkout session.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let email = Email::parse(&request.email)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    request.selection.validate()?;
    if request.selection.is_empty() {
        return Err(AppError::BadRequest(
            "select at least one service".to_string(),
        ));
    }

    let zip_raw = request
        .address
        .postal_code
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("pickup address needs a ZIP code".to_string()))?;
    let zip = Zip::parse(zip_raw).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if !state.service_area().is_served(&zip) {
        return Err(AppError::BadRequest(format!(
            "Curbside does not serve {zip} yet"
        )));
    }

    let line_items = build_line_items(&request.selection, state.price_table())?;
    let quote = state.pricing().quote(&request.selection);

    let snapshot = SignupSnapshot {
        selection: request.selection,
        email: email.as_str().to_owned(),
        name: request.name,
        phone: request.phone,
        address: request.address,
        reminders: request.reminders,
    };
    let signup_metadata = serde_json::to_string(&snapshot)
        .map_err(|e| AppError::Internal(format!("failed to serialize signup snapshot: {e}")))?;

    let base_url = &state.config().base_url;
    let session = state
        .stripe()
        .create_checkout_session(&CheckoutSessionParams {
            line_items,
            customer_email: email.into_inner(),
            success_url: format!("{base_url}/signup/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base_url}/signup/service-details"),
            signup_metadata,
        })
        .await?;

    let url = session.url.ok_or_else(|| {
        AppError::Internal("checkout session created without a hosted url".to_string())
    })?;

    tracing::info!(session_id = %session.id, total = %quote.total, "Checkout session created");

    Ok(Json(CheckoutResponse {
        url,
        session_id: session.id,
        quote,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use curbside_core::{Frequency, SelectionState, ServiceType, Weekday};

    #[test]
    fn test_checkout_request_deserializes_form_snapshot() {
        // The shape the signup page persists to session storage and submits.
        let body = r#"{
            "selection": {
                "trash": {"enabled": true, "day": "monday", "frequency": "weekly", "quantity": 2}
            },
            "email": "resident@example.com",
            "name": "Jordan Resident",
            "address": {"line1": "12 Birch St", "city": "Longmont", "state": "CO", "postal_code": "80501"},
            "reminders": true
        }"#;

        let request: CheckoutRequest = serde_json::from_str(body).unwrap();
        assert!(request.selection.get(ServiceType::Trash).enabled);
        assert_eq!(
            request.selection.get(ServiceType::Trash).day,
            Some(Weekday::Monday)
        );
        assert_eq!(
            request.selection.get(ServiceType::Trash).frequency,
            Some(Frequency::Weekly)
        );
        assert!(request.reminders);
        assert!(request.selection.validate().is_ok());
    }

    #[test]
    fn test_snapshot_metadata_is_readable_back() {
        let mut selection = SelectionState::new();
        selection.enable(ServiceType::Compost);
        selection.set_day(ServiceType::Compost, Weekday::Friday);
        selection.set_frequency(ServiceType::Compost, Frequency::Monthly);

        let snapshot = SignupSnapshot {
            selection,
            email: "resident@example.com".to_owned(),
            name: None,
            phone: None,
            address: SignupAddress::default(),
            reminders: false,
        };

        let metadata = serde_json::to_string(&snapshot).unwrap();
        let parsed: SignupSnapshot = serde_json::from_str(&metadata).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
