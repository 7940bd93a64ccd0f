//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! curbside-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SIGNUP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Errors that can occur while running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the signup database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = std::env::var("SIGNUP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("SIGNUP_DATABASE_URL"))?
        .into();

    tracing::info!("Connecting to signup database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running signup migrations...");
    sqlx::migrate!("../signup/migrations").run(&pool).await?;

    tracing::info!("Signup migrations complete!");
    Ok(())
}
