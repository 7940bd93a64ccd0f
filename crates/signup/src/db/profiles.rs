//! Profile repository for database operations.

use chrono::{DateTime, Utc};
use curbside_core::{Email, ProfileId};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::RepositoryError;
use crate::models::{Profile, SignupAddress};

/// Input for a profile upsert.
#[derive(Debug, Clone)]
pub struct ProfileUpsert {
    pub stripe_customer_id: String,
    pub email: Option<Email>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: SignupAddress,
    pub reminders_enabled: bool,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a profile, keyed by the Stripe customer id.
    ///
    /// Re-delivery of the same completion event hits the conflict arm and
    /// rewrites the same values, so the operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn upsert(&self, input: &ProfileUpsert) -> Result<Profile, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO profile (
                stripe_customer_id, email, name, phone,
                address_line1, address_line2, city, state, postal_code,
                reminders_enabled
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (stripe_customer_id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                address_line1 = EXCLUDED.address_line1,
                address_line2 = EXCLUDED.address_line2,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                postal_code = EXCLUDED.postal_code,
                reminders_enabled = EXCLUDED.reminders_enabled,
                updated_at = NOW()
            RETURNING id, stripe_customer_id, email, name, phone,
                      address_line1, address_line2, city, state, postal_code,
                      reminders_enabled, created_at, updated_at
            ",
        )
        .bind(&input.stripe_customer_id)
        .bind(input.email.as_ref().map(Email::as_str))
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address.line1)
        .bind(&input.address.line2)
        .bind(&input.address.city)
        .bind(&input.address.state)
        .bind(&input.address.postal_code)
        .bind(input.reminders_enabled)
        .fetch_one(self.pool)
        .await?;

        profile_from_row(&row)
    }

    /// Get a profile by its Stripe customer id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_by_stripe_customer(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, stripe_customer_id, email, name, phone,
                   address_line1, address_line2, city, state, postal_code,
                   reminders_enabled, created_at, updated_at
            FROM profile
            WHERE stripe_customer_id = $1
            ",
        )
        .bind(stripe_customer_id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }
}

fn profile_from_row(row: &PgRow) -> Result<Profile, RepositoryError> {
    let email = row
        .try_get::<Option<String>, _>("email")?
        .map(|raw| {
            Email::parse(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })
        })
        .transpose()?;

    Ok(Profile {
        id: ProfileId::new(row.try_get("id")?),
        stripe_customer_id: row.try_get("stripe_customer_id")?,
        email,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        address: SignupAddress {
            line1: row.try_get("address_line1")?,
            line2: row.try_get("address_line2")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            postal_code: row.try_get("postal_code")?,
        },
        reminders_enabled: row.try_get("reminders_enabled")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}
