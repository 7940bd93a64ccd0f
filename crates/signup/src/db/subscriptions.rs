//! Service subscription repository.

use chrono::{DateTime, Utc};
use curbside_core::{ProfileId, ServiceType, SubscriptionId};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::RepositoryError;
use crate::models::ServiceSubscription;

/// Input for a subscription upsert.
#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub profile_id: ProfileId,
    pub service: ServiceType,
    pub stripe_subscription_id: Option<String>,
    pub checkout_session_id: String,
    pub monthly_price: Decimal,
}

/// Repository for subscription rows.
pub struct SubscriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the subscription row for `(profile, service)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn upsert(
        &self,
        input: &SubscriptionUpsert,
    ) -> Result<ServiceSubscription, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO service_subscription (
                profile_id, service_type, stripe_subscription_id,
                checkout_session_id, monthly_price
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (profile_id, service_type) DO UPDATE SET
                stripe_subscription_id = EXCLUDED.stripe_subscription_id,
                checkout_session_id = EXCLUDED.checkout_session_id,
                monthly_price = EXCLUDED.monthly_price,
                updated_at = NOW()
            RETURNING id, profile_id, service_type, stripe_subscription_id,
                      checkout_session_id, monthly_price, created_at
            ",
        )
        .bind(input.profile_id.as_i64())
        .bind(input.service.as_str())
        .bind(&input.stripe_subscription_id)
        .bind(&input.checkout_session_id)
        .bind(input.monthly_price)
        .fetch_one(self.pool)
        .await?;

        subscription_from_row(&row)
    }
}

fn subscription_from_row(row: &PgRow) -> Result<ServiceSubscription, RepositoryError> {
    let service: ServiceType = row
        .try_get::<String, _>("service_type")?
        .parse()
        .map_err(RepositoryError::DataCorruption)?;

    Ok(ServiceSubscription {
        id: SubscriptionId::new(row.try_get("id")?),
        profile_id: ProfileId::new(row.try_get("profile_id")?),
        service,
        stripe_subscription_id: row.try_get("stripe_subscription_id")?,
        checkout_session_id: row.try_get("checkout_session_id")?,
        monthly_price: row.try_get::<Decimal, _>("monthly_price")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
