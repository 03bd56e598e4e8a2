use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{Appointment, AppointmentStatus};

const COLUMNS: &str =
    "id, staff_id, customer_id, service_id, start_time, end_time, status, notes, created_at, updated_at";

/// Appointment reads and the guarded write path. Occupancy queries only
/// ever count pending/confirmed rows; cancelled, completed, and no-show
/// appointments never block.
pub struct AppointmentRepository;

impl AppointmentRepository {
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Appointment, DatabaseError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Occupying appointments intersecting [day_start, day_end), sorted by
    /// (start_time, id) for deterministic conflict citation.
    pub async fn occupying_for_day<'e, E>(
        executor: E,
        day_start: OffsetDateTime,
        day_end: OffsetDateTime,
        staff_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, DatabaseError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, Appointment>(&format!(
            r#"SELECT {COLUMNS} FROM appointments
               WHERE status IN ('pending', 'confirmed')
                 AND start_time < $1 AND end_time > $2
                 AND ($3::uuid IS NULL OR staff_id = $3)
               ORDER BY start_time, id"#
        ))
        .bind(day_end)
        .bind(day_start)
        .bind(staff_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Occupying appointments for one staff member overlapping the proposed
    /// [start, end) interval. Used both for the pre-check and for the
    /// re-check inside the insert transaction.
    pub async fn occupying_overlapping<'e, E>(
        executor: E,
        staff_id: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, DatabaseError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, Appointment>(&format!(
            r#"SELECT {COLUMNS} FROM appointments
               WHERE staff_id = $1
                 AND status IN ('pending', 'confirmed')
                 AND start_time < $2 AND end_time > $3
                 AND ($4::uuid IS NULL OR id <> $4)
               ORDER BY start_time, id"#
        ))
        .bind(staff_id)
        .bind(end)
        .bind(start)
        .bind(exclude_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Serialize concurrent bookings for one staff member by locking their
    /// row for the rest of the transaction.
    pub async fn lock_staff_row(
        tx: &mut Transaction<'_, Postgres>,
        staff_id: Uuid,
    ) -> Result<(), DatabaseError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM staff WHERE id = $1 FOR UPDATE")
                .bind(staff_id)
                .fetch_optional(&mut **tx)
                .await?;
        row.map(|_| ()).ok_or(DatabaseError::NotFound)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        staff_id: Uuid,
        customer_id: Uuid,
        service_id: Uuid,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        notes: Option<&str>,
    ) -> Result<Appointment, DatabaseError> {
        let row = sqlx::query_as::<_, Appointment>(&format!(
            r#"INSERT INTO appointments
                   (staff_id, customer_id, service_id, start_time, end_time, status, notes)
               VALUES ($1, $2, $3, $4, $5, 'pending', $6)
               RETURNING {COLUMNS}"#
        ))
        .bind(staff_id)
        .bind(customer_id)
        .bind(service_id)
        .bind(start_time)
        .bind(end_time)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn update_status<'e, E>(
        executor: E,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, DatabaseError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"UPDATE appointments
               SET status = $2, updated_at = now()
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn update_times(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Result<Appointment, DatabaseError> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"UPDATE appointments
               SET start_time = $2, end_time = $3, updated_at = now()
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(start_time)
        .bind(end_time)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }
}
