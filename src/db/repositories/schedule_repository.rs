use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{
    BusinessDay, HolidayException, StaffScheduleException, StaffWorkingHours,
};

/// Read-only schedule queries: weekly business hours, staff hours, and the
/// date-specific overrides for both.
pub struct ScheduleRepository;

impl ScheduleRepository {
    pub async fn business_days(pool: &PgPool) -> Result<Vec<BusinessDay>, DatabaseError> {
        let rows = sqlx::query_as::<_, BusinessDay>(
            "SELECT weekday, opens_at, closes_at, is_open FROM business_days ORDER BY weekday",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn business_day(
        pool: &PgPool,
        weekday: i16,
    ) -> Result<Option<BusinessDay>, DatabaseError> {
        let row = sqlx::query_as::<_, BusinessDay>(
            "SELECT weekday, opens_at, closes_at, is_open FROM business_days WHERE weekday = $1",
        )
        .bind(weekday)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn holiday_exception(
        pool: &PgPool,
        date: Date,
    ) -> Result<Option<HolidayException>, DatabaseError> {
        let row = sqlx::query_as::<_, HolidayException>(
            r#"SELECT id, date, enabled, time_slots, reason
               FROM holiday_exceptions
               WHERE date = $1"#,
        )
        .bind(date)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn staff_working_hours(
        pool: &PgPool,
        staff_id: Uuid,
        weekday: i16,
    ) -> Result<Option<StaffWorkingHours>, DatabaseError> {
        let row = sqlx::query_as::<_, StaffWorkingHours>(
            r#"SELECT id, staff_id, weekday, enabled, time_slots
               FROM staff_working_hours
               WHERE staff_id = $1 AND weekday = $2"#,
        )
        .bind(staff_id)
        .bind(weekday)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// The full weekly pattern for one staff member, for calendar display.
    pub async fn weekly_schedule(
        pool: &PgPool,
        staff_id: Uuid,
    ) -> Result<Vec<StaffWorkingHours>, DatabaseError> {
        let rows = sqlx::query_as::<_, StaffWorkingHours>(
            r#"SELECT id, staff_id, weekday, enabled, time_slots
               FROM staff_working_hours
               WHERE staff_id = $1
               ORDER BY weekday"#,
        )
        .bind(staff_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn staff_schedule_exception(
        pool: &PgPool,
        staff_id: Uuid,
        date: Date,
    ) -> Result<Option<StaffScheduleException>, DatabaseError> {
        let row = sqlx::query_as::<_, StaffScheduleException>(
            r#"SELECT id, staff_id, date, enabled, time_slots, reason
               FROM staff_schedule_exceptions
               WHERE staff_id = $1 AND date = $2"#,
        )
        .bind(staff_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }
}
