//! Stripe collaborator: checkout-session creation and webhook verification.
//!
//! Stripe is treated as an external service spoken to over plain HTTP - the
//! client covers exactly the two interactions this service needs (creating a
//! hosted checkout session and verifying webhook signatures) and nothing
//! else.

pub mod client;
pub mod event;
pub mod webhook;

use thiserror::Error;

pub use client::{CheckoutSessionParams, CreatedSession, StripeClient};
pub use event::{CHECKOUT_SESSION_COMPLETED, CheckoutSession, Event};

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),
}
