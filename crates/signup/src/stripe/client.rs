//! Stripe API client for hosted checkout sessions.

use curbside_core::LineItem;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::StripeError;
use crate::config::StripeConfig;
use crate::models::SIGNUP_METADATA_KEY;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Parameters for creating a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    /// Line items (base fee first, then one per enabled service).
    pub line_items: Vec<LineItem>,
    /// Customer email, prefilled on the hosted page.
    pub customer_email: String,
    /// Where Stripe redirects after payment.
    pub success_url: String,
    /// Where Stripe redirects on cancel.
    pub cancel_url: String,
    /// The serialized signup snapshot, stored under the `signup` metadata
    /// key and read back by the webhook.
    pub signup_metadata: String,
}

/// A created checkout session, as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSession {
    /// Session id (`cs_...`).
    pub id: String,
    /// Hosted checkout URL the client redirects to.
    #[serde(default)]
    pub url: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: SecretString,
}

impl StripeClient {
    /// Create a new Stripe API client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create a subscription-mode hosted checkout session.
    ///
    /// Returns the session id and the hosted URL to redirect the customer
    /// to.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if the request fails, the API rejects it, or
    /// the response has no hosted URL.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CreatedSession, StripeError> {
        let form = build_session_form(params);

        let response = self
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CreatedSession = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        if session.url.is_none() {
            return Err(StripeError::Parse(
                "checkout session response has no url".to_string(),
            ));
        }

        Ok(session)
    }
}

/// Flatten the params into Stripe's form-encoded array syntax.
fn build_session_form(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_owned(), "subscription".to_owned()),
        ("success_url".to_owned(), params.success_url.clone()),
        ("cancel_url".to_owned(), params.cancel_url.clone()),
        ("customer_email".to_owned(), params.customer_email.clone()),
        (
            format!("metadata[{SIGNUP_METADATA_KEY}]"),
            params.signup_metadata.clone(),
        ),
    ];

    for (index, item) in params.line_items.iter().enumerate() {
        form.push((format!("line_items[{index}][price]"), item.price_id.clone()));
        form.push((
            format!("line_items[{index}][quantity]"),
            item.quantity.to_string(),
        ));
    }

    form
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_session_form_flattens_line_items() {
        let params = CheckoutSessionParams {
            line_items: vec![
                LineItem {
                    price_id: "price_base".to_owned(),
                    quantity: 1,
                },
                LineItem {
                    price_id: "price_trash_weekly".to_owned(),
                    quantity: 2,
                },
            ],
            customer_email: "resident@example.com".to_owned(),
            success_url: "https://curbside.example/signup/success".to_owned(),
            cancel_url: "https://curbside.example/signup".to_owned(),
            signup_metadata: "{}".to_owned(),
        };

        let form = build_session_form(&params);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("subscription"));
        assert_eq!(get("line_items[0][price]"), Some("price_base"));
        assert_eq!(get("line_items[0][quantity]"), Some("1"));
        assert_eq!(get("line_items[1][price]"), Some("price_trash_weekly"));
        assert_eq!(get("line_items[1][quantity]"), Some("2"));
        assert_eq!(get("metadata[signup]"), Some("{}"));
    }
}
