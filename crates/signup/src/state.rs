//! Application state shared across handlers.

use std::sync::Arc;

use curbside_core::{PriceTable, PricingEngine};
use sqlx::PgPool;

use crate::area::ServiceArea;
use crate::config::SignupConfig;
use crate::services::NotifyClient;
use crate::stripe::StripeClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration. It is
/// read-only after startup - the service keeps no cross-request mutable
/// state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SignupConfig,
    pool: PgPool,
    stripe: StripeClient,
    pricing: PricingEngine,
    notify: Option<NotifyClient>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SignupConfig, pool: PgPool) -> Self {
        let stripe = StripeClient::new(&config.stripe);
        let pricing = PricingEngine::new(config.pricing);
        let notify = config.notify.as_ref().map(NotifyClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                pricing,
                notify,
            }),
        }
    }

    /// Get a reference to the signup configuration.
    #[must_use]
    pub fn config(&self) -> &SignupConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe API client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the pricing engine.
    #[must_use]
    pub fn pricing(&self) -> &PricingEngine {
        &self.inner.pricing
    }

    /// Get a reference to the checkout price table.
    #[must_use]
    pub fn price_table(&self) -> &PriceTable {
        &self.inner.config.price_table
    }

    /// Get a reference to the served ZIP set.
    #[must_use]
    pub fn service_area(&self) -> &ServiceArea {
        &self.inner.config.service_area
    }

    /// Get the notification client, if configured.
    #[must_use]
    pub fn notify(&self) -> Option<&NotifyClient> {
        self.inner.notify.as_ref()
    }
}
