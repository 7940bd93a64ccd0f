//! Notification provider client.
//!
//! Sends the post-checkout welcome message. Every caller treats failures as
//! non-fatal: a customer who paid but missed an email is an annoyance, a
//! webhook that 500s over an email is a re-delivery loop.

use curbside_core::Quote;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::config::NotifyConfig;

/// Notification API base URL.
const BASE_URL: &str = "https://api.notificationapi.com";

/// Notification id for the post-checkout welcome message.
const WELCOME_NOTIFICATION: &str = "signup_confirmation";

/// Errors that can occur when sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Notification provider client.
#[derive(Clone)]
pub struct NotifyClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl NotifyClient {
    /// Create a new notification client.
    #[must_use]
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Send the welcome message for a completed signup.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the request fails or the API rejects it.
    /// Callers log and swallow - notification failure never fails the
    /// webhook.
    pub async fn send_welcome(
        &self,
        email: &str,
        name: Option<&str>,
        quote: &Quote,
    ) -> Result<(), NotifyError> {
        let url = format!("{BASE_URL}/{}/sender", self.client_id);

        let body = serde_json::json!({
            "notificationId": WELCOME_NOTIFICATION,
            "user": {
                "id": email,
                "email": email,
            },
            "mergeTags": {
                "name": name.unwrap_or("there"),
                "monthlyTotal": quote.total.to_string(),
            },
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        // 202 Accepted is the normal response for queued sends
        if !status.is_success() && status != StatusCode::ACCEPTED {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
