//! Pickup schedule repository.

use chrono::{DateTime, Utc};
use curbside_core::{Frequency, ProfileId, ScheduleId, ServiceType, Weekday};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::RepositoryError;
use crate::models::ServiceSchedule;

/// Input for a schedule upsert.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleUpsert {
    pub profile_id: ProfileId,
    pub service: ServiceType,
    pub pickup_day: Weekday,
    pub frequency: Frequency,
    pub quantity: u32,
}

/// Repository for pickup schedule rows.
pub struct ScheduleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScheduleRepository<'a> {
    /// Create a new schedule repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the schedule row for `(profile, service)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn upsert(&self, input: &ScheduleUpsert) -> Result<ServiceSchedule, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO service_schedule (
                profile_id, service_type, pickup_day, frequency, quantity
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (profile_id, service_type) DO UPDATE SET
                pickup_day = EXCLUDED.pickup_day,
                frequency = EXCLUDED.frequency,
                quantity = EXCLUDED.quantity,
                updated_at = NOW()
            RETURNING id, profile_id, service_type, pickup_day, frequency,
                      quantity, created_at
            ",
        )
        .bind(input.profile_id.as_i64())
        .bind(input.service.as_str())
        .bind(input.pickup_day.as_str())
        .bind(input.frequency.as_str())
        .bind(i32::try_from(input.quantity).unwrap_or(i32::MAX))
        .fetch_one(self.pool)
        .await?;

        schedule_from_row(&row)
    }

    /// All schedule rows for a profile, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_profile(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<ServiceSchedule>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, profile_id, service_type, pickup_day, frequency,
                   quantity, created_at
            FROM service_schedule
            WHERE profile_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(profile_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(schedule_from_row).collect()
    }
}

fn schedule_from_row(row: &PgRow) -> Result<ServiceSchedule, RepositoryError> {
    let service: ServiceType = row
        .try_get::<String, _>("service_type")?
        .parse()
        .map_err(RepositoryError::DataCorruption)?;
    let pickup_day: Weekday = row
        .try_get::<String, _>("pickup_day")?
        .parse()
        .map_err(RepositoryError::DataCorruption)?;
    let frequency: Frequency = row
        .try_get::<String, _>("frequency")?
        .parse()
        .map_err(RepositoryError::DataCorruption)?;
    let quantity = u32::try_from(row.try_get::<i32, _>("quantity")?)
        .map_err(|_| RepositoryError::DataCorruption("negative quantity".to_owned()))?;

    Ok(ServiceSchedule {
        id: ScheduleId::new(row.try_get("id")?),
        profile_id: ProfileId::new(row.try_get("profile_id")?),
        service,
        pickup_day,
        frequency,
        quantity,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
