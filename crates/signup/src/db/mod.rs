//! Database operations for the signup `PostgreSQL`.
//!
//! # Database: `curbside`
//!
//! Stores the records provisioned when a checkout completes:
//!
//! ## Tables
//!
//! - `profile` - Customer identity, address, and reminder preference
//! - `service_schedule` - Pickup day/frequency/quantity per enabled service
//! - `service_subscription` - Payment-processor subscription per enabled service
//!
//! All writes are idempotent upserts: the webhook may deliver the same
//! completion event more than once, and ordering between deliveries is not
//! guaranteed.
//!
//! Queries are runtime-bound (`sqlx::query` + `bind`) rather than the
//! compile-time macros, so the workspace builds without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/signup/migrations/` and run via:
//! ```bash
//! cargo run -p curbside-cli -- migrate
//! ```

pub mod profiles;
pub mod schedules;
pub mod subscriptions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use profiles::{ProfileRepository, ProfileUpsert};
pub use schedules::{ScheduleRepository, ScheduleUpsert};
pub use subscriptions::{SubscriptionRepository, SubscriptionUpsert};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
