//! HTTP route handlers for the signup API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (pings the database)
//!
//! # Signup API
//! GET  /api/service-area/{zip}    - Is this ZIP inside the service area?
//! POST /api/quote                 - Price a service selection
//! POST /api/checkout              - Create a hosted checkout session
//! POST /api/webhook               - Payment-processor webhook (signed)
//! ```

pub mod checkout;
pub mod quote;
pub mod service_area;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/service-area/{zip}", get(service_area::lookup))
        .route("/api/quote", post(quote::quote))
        .route("/api/checkout", post(checkout::create))
        .route("/api/webhook", post(webhook::receive))
}
