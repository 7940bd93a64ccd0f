//! Signup service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SIGNUP_DATABASE_URL` - `PostgreSQL` connection string
//! - `SIGNUP_BASE_URL` - Public URL the signup pages are served from
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook endpoint secret
//! - `STRIPE_PRICE_BASE` - Price id for the monthly base fee
//! - `STRIPE_PRICE_<SERVICE>_<FREQUENCY>` - Price id per (service, frequency)
//!   pair, e.g. `STRIPE_PRICE_TRASH_WEEKLY`, `STRIPE_PRICE_COMPOST_MONTHLY`
//!
//! ## Optional
//! - `SIGNUP_HOST` - Bind address (default: 127.0.0.1)
//! - `SIGNUP_PORT` - Listen port (default: 3000)
//! - `CURBSIDE_BASE_FEE` - Monthly base fee in dollars (default: 39)
//! - `CURBSIDE_SERVICE_ZIPS` - Comma-separated served ZIP codes; when unset
//!   every structurally valid ZIP is eligible
//! - `NOTIFY_CLIENT_ID` / `NOTIFY_CLIENT_SECRET` - Notification provider
//!   credentials; notifications are disabled when unset
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use curbside_core::{Frequency, PriceTable, PricingConfig, ServiceType};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use crate::area::ServiceArea;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Signup service configuration.
#[derive(Debug, Clone)]
pub struct SignupConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL the signup pages redirect back to
    pub base_url: String,
    /// Stripe API configuration
    pub stripe: StripeConfig,
    /// Price ids for the hosted checkout
    pub price_table: PriceTable,
    /// Pricing engine parameters
    pub pricing: PricingConfig,
    /// ZIP codes Curbside serves
    pub service_area: ServiceArea,
    /// Notification provider credentials, if configured
    pub notify: Option<NotifyConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe API secret key (server-side only)
    pub secret_key: SecretString,
    /// Webhook endpoint signing secret
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

/// Notification provider credentials.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Provider client id
    pub client_id: String,
    /// Provider client secret
    pub client_secret: SecretString,
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl SignupConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SIGNUP_DATABASE_URL")?;
        let host = get_env_or_default("SIGNUP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SIGNUP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SIGNUP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SIGNUP_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SIGNUP_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SIGNUP_BASE_URL".to_string(), e.to_string())
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let stripe = StripeConfig::from_env()?;
        let price_table = load_price_table()?;
        let pricing = load_pricing()?;
        let service_area = load_service_area();
        let notify = NotifyConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            stripe,
            price_table,
            pricing,
            service_area,
            notify,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
        })
    }
}

impl NotifyConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(client_id) = get_optional_env("NOTIFY_CLIENT_ID") else {
            return Ok(None);
        };
        let client_secret = get_validated_secret("NOTIFY_CLIENT_SECRET")?;
        Ok(Some(Self {
            client_id,
            client_secret,
        }))
    }
}

/// Environment variable name for a (service, frequency) price id.
fn price_env_key(service: ServiceType, frequency: Frequency) -> String {
    format!(
        "STRIPE_PRICE_{}_{}",
        service.as_str().to_uppercase(),
        frequency.as_str().to_uppercase()
    )
}

/// Load the full price-id table; every pair must be configured.
fn load_price_table() -> Result<PriceTable, ConfigError> {
    let mut table = PriceTable::new(get_required_env("STRIPE_PRICE_BASE")?);
    for service in ServiceType::ALL {
        for frequency in Frequency::ALL {
            let key = price_env_key(service, frequency);
            table.insert(service, frequency, get_required_env(&key)?);
        }
    }
    Ok(table)
}

fn load_pricing() -> Result<PricingConfig, ConfigError> {
    match get_optional_env("CURBSIDE_BASE_FEE") {
        None => Ok(PricingConfig::default()),
        Some(raw) => {
            let base_fee = raw.parse::<Decimal>().map_err(|e| {
                ConfigError::InvalidEnvVar("CURBSIDE_BASE_FEE".to_string(), e.to_string())
            })?;
            Ok(PricingConfig::new(base_fee))
        }
    }
}

fn load_service_area() -> ServiceArea {
    get_optional_env("CURBSIDE_SERVICE_ZIPS").map_or_else(ServiceArea::open, |raw| {
        ServiceArea::from_list(raw.split(',').map(str::trim))
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by managed
/// Postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real key from the dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
