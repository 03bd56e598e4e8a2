//! Async façade over the pure availability core: loads schedule and
//! occupancy rows, delegates to the resolver and conflict checker, and
//! packages the calendar bundle. Also owns the guarded booking write path.

use serde::Serialize;
use sqlx::PgPool;
use time::{Date, Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, info};
use uuid::Uuid;

use crate::availability::cache::AvailabilityCache;
use crate::availability::conflict::{self, ConflictResult, ProposedBooking};
use crate::availability::interval::{self, minutes_of, DayWindow, DAY_END_MIN};
use crate::availability::resolver::{self, DaySchedule, StaffDaySchedule};
use crate::db::{
    Appointment, AppointmentRepository, AppointmentStatus, CatalogRepository, DatabaseError,
    HolidayException, NewAppointment, RescheduleAppointment, ScheduleRepository,
    StaffScheduleException, StaffWorkingHours,
};

/// Everything a calendar view needs for one (date, staff?) query.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityBundle {
    pub date: Date,
    pub business_hours: Vec<DayWindow>,
    pub staff_schedule: Option<Vec<StaffWorkingHours>>,
    /// Effective windows with occupying appointments carved out.
    pub open_slots: Vec<DayWindow>,
    pub appointments: Vec<Appointment>,
    pub holiday: Option<HolidayException>,
    pub staff_exception: Option<StaffScheduleException>,
}

/// Outcome of a booking write: either the committed row or the conflict
/// that blocked it. A conflict is a normal negative result, not an error.
#[derive(Debug)]
pub enum BookingOutcome {
    Booked(Appointment),
    Rejected(ConflictResult),
}

fn weekday_index(date: Date) -> i16 {
    date.weekday().number_days_from_sunday() as i16
}

fn day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = date.midnight().assume_utc();
    (start, start + Duration::days(1))
}

fn tx_error(err: sqlx::Error) -> DatabaseError {
    DatabaseError::Transaction(err.to_string())
}

/// Clamp an appointment's interval to the queried day, in minutes.
fn busy_window(
    appointment: &Appointment,
    day_start: OffsetDateTime,
    day_end: OffsetDateTime,
) -> Option<DayWindow> {
    let start = appointment.start_time.max(day_start);
    let end = appointment.end_time.min(day_end);
    if start >= end {
        return None;
    }
    let start_min = minutes_of(start.time());
    let end_min = if end == day_end {
        DAY_END_MIN
    } else {
        minutes_of(end.time())
    };
    Some(DayWindow::new(start_min, end_min))
}

/// Schedule windows with the occupying appointments' intervals carved out,
/// each appointment clamped to the queried day.
fn carve_occupancy(
    open: &[DayWindow],
    appointments: &[Appointment],
    day_start: OffsetDateTime,
    day_end: OffsetDateTime,
) -> Vec<DayWindow> {
    let busy: Vec<DayWindow> = appointments
        .iter()
        .filter_map(|a| busy_window(a, day_start, day_end))
        .collect();
    interval::subtract(open, &busy)
}

/// A transition needs the booking guard only when it turns a non-occupying
/// appointment back into an occupying one; its interval may have been taken
/// in the meantime.
fn requires_occupancy_guard(current: AppointmentStatus, target: AppointmentStatus) -> bool {
    target.is_occupying() && !current.is_occupying()
}

/// Load the schedule rows for one (date, staff?) and resolve the effective
/// windows before any occupancy is applied.
async fn effective_windows(
    pool: &PgPool,
    date: Date,
    staff_id: Option<Uuid>,
) -> Result<Vec<DayWindow>, DatabaseError> {
    let weekday = weekday_index(date);
    let business_day = ScheduleRepository::business_day(pool, weekday).await?;
    let holiday = ScheduleRepository::holiday_exception(pool, date).await?;

    let staff_rows = match staff_id {
        Some(id) => Some((
            ScheduleRepository::staff_working_hours(pool, id, weekday).await?,
            ScheduleRepository::staff_schedule_exception(pool, id, date).await?,
        )),
        None => None,
    };

    let schedule = DaySchedule {
        business_day: business_day.as_ref(),
        holiday: holiday.as_ref(),
        staff: staff_rows.as_ref().map(|(weekly, exception)| StaffDaySchedule {
            weekly: weekly.as_ref(),
            exception: exception.as_ref(),
        }),
    };
    Ok(resolver::effective_windows(&schedule))
}

/// Open, bookable windows for a date: schedule windows minus occupying
/// appointment intervals. Empty means closed.
pub async fn resolve_daily_availability(
    pool: &PgPool,
    date: Date,
    staff_id: Option<Uuid>,
) -> Result<Vec<DayWindow>, DatabaseError> {
    let open = effective_windows(pool, date, staff_id).await?;
    if open.is_empty() {
        return Ok(open);
    }
    let (day_start, day_end) = day_bounds(date);
    let occupying =
        AppointmentRepository::occupying_for_day(pool, day_start, day_end, staff_id).await?;
    Ok(carve_occupancy(&open, &occupying, day_start, day_end))
}

/// Pure pre-check for a proposed booking, loading the data it decides over.
/// Side-effect free; the write path re-runs the overlap check inside its
/// own transaction.
pub async fn check_conflict(
    pool: &PgPool,
    proposed: &ProposedBooking,
) -> Result<ConflictResult, DatabaseError> {
    if proposed.duration_minutes <= 0 {
        return Err(DatabaseError::InvalidInput(
            "duration must be positive".into(),
        ));
    }
    CatalogRepository::staff_by_id(pool, proposed.staff_id).await?;

    // Occupancy bounds and windows are UTC; a +03:00 request must not be
    // evaluated against the wrong day's schedule.
    let date = proposed.start.to_offset(UtcOffset::UTC).date();
    let windows = effective_windows(pool, date, Some(proposed.staff_id)).await?;
    let (day_start, day_end) = day_bounds(date);
    let occupying = AppointmentRepository::occupying_for_day(
        pool,
        day_start,
        day_end,
        Some(proposed.staff_id),
    )
    .await?;

    let result = conflict::check(&windows, &occupying, proposed);
    debug!(
        staff_id = %proposed.staff_id,
        start = %proposed.start,
        has_conflict = result.has_conflict,
        within_availability = result.within_availability,
        "conflict check"
    );
    Ok(result)
}

/// The §4.4-style façade payload, cached per (date, staff) with a TTL.
pub async fn availability_bundle(
    pool: &PgPool,
    cache: &AvailabilityCache,
    date: Date,
    staff_id: Option<Uuid>,
) -> Result<AvailabilityBundle, DatabaseError> {
    if let Some(cached) = cache.get(date, staff_id) {
        return Ok(cached);
    }

    let weekday = weekday_index(date);
    let business_day = ScheduleRepository::business_day(pool, weekday).await?;
    let holiday = ScheduleRepository::holiday_exception(pool, date).await?;
    let business_hours = resolver::business_windows(business_day.as_ref(), holiday.as_ref());

    let (staff_schedule, staff_exception) = match staff_id {
        Some(id) => {
            CatalogRepository::staff_by_id(pool, id).await?;
            (
                Some(ScheduleRepository::weekly_schedule(pool, id).await?),
                ScheduleRepository::staff_schedule_exception(pool, id, date).await?,
            )
        }
        None => (None, None),
    };

    let (day_start, day_end) = day_bounds(date);
    let appointments =
        AppointmentRepository::occupying_for_day(pool, day_start, day_end, staff_id).await?;
    let open_slots = resolve_daily_availability(pool, date, staff_id).await?;

    let bundle = AvailabilityBundle {
        date,
        business_hours,
        staff_schedule,
        open_slots,
        appointments,
        holiday,
        staff_exception,
    };
    cache.insert(date, staff_id, bundle.clone());
    Ok(bundle)
}

/// Create a booking. The conflict check runs twice: once against the pool
/// for a fast rejection, then again inside the insert transaction after
/// taking the staff row lock, so two concurrent requests for the same
/// staff cannot both commit overlapping intervals.
pub async fn create_appointment(
    pool: &PgPool,
    cache: &AvailabilityCache,
    new: &NewAppointment,
) -> Result<BookingOutcome, DatabaseError> {
    let duration_minutes = match new.duration_minutes {
        Some(minutes) => minutes,
        None => {
            let service = CatalogRepository::service_by_id(pool, new.service_id).await?;
            service.duration_minutes as i64
        }
    };
    CatalogRepository::customer_by_id(pool, new.customer_id).await?;

    let proposed = ProposedBooking {
        staff_id: new.staff_id,
        start: new.start_time,
        duration_minutes,
        exclude_appointment_id: None,
    };
    let precheck = check_conflict(pool, &proposed).await?;
    if precheck.has_conflict {
        return Ok(BookingOutcome::Rejected(precheck));
    }

    let end_time = new.end_time(duration_minutes);
    let mut tx = pool.begin().await.map_err(tx_error)?;
    AppointmentRepository::lock_staff_row(&mut tx, new.staff_id).await?;
    let overlapping = AppointmentRepository::occupying_overlapping(
        &mut *tx,
        new.staff_id,
        new.start_time,
        end_time,
        None,
    )
    .await?;
    if let Some(existing) = overlapping.first() {
        tx.rollback().await.map_err(tx_error)?;
        return Ok(BookingOutcome::Rejected(ConflictResult {
            has_conflict: true,
            within_availability: true,
            conflicting_appointment_id: Some(existing.id),
            message: Some("Time slot was taken by a concurrent booking".into()),
        }));
    }
    let appointment = AppointmentRepository::insert(
        &mut tx,
        new.staff_id,
        new.customer_id,
        new.service_id,
        new.start_time,
        end_time,
        new.notes.as_deref(),
    )
    .await?;
    tx.commit().await.map_err(tx_error)?;

    info!(appointment_id = %appointment.id, staff_id = %appointment.staff_id, "appointment booked");
    invalidate_span(cache, appointment.start_time, appointment.end_time);
    Ok(BookingOutcome::Booked(appointment))
}

/// Move an existing appointment, with the same transactional guard as
/// creation. The appointment never conflicts with itself.
pub async fn reschedule_appointment(
    pool: &PgPool,
    cache: &AvailabilityCache,
    id: Uuid,
    change: &RescheduleAppointment,
) -> Result<BookingOutcome, DatabaseError> {
    let current = AppointmentRepository::find(pool, id).await?;
    let duration_minutes = match change.duration_minutes {
        Some(minutes) => minutes,
        None => (current.end_time - current.start_time).whole_minutes(),
    };

    let proposed = ProposedBooking {
        staff_id: current.staff_id,
        start: change.start_time,
        duration_minutes,
        exclude_appointment_id: Some(id),
    };
    let precheck = check_conflict(pool, &proposed).await?;
    if precheck.has_conflict {
        return Ok(BookingOutcome::Rejected(precheck));
    }

    let end_time = change.start_time + Duration::minutes(duration_minutes);
    let mut tx = pool.begin().await.map_err(tx_error)?;
    AppointmentRepository::lock_staff_row(&mut tx, current.staff_id).await?;
    let overlapping = AppointmentRepository::occupying_overlapping(
        &mut *tx,
        current.staff_id,
        change.start_time,
        end_time,
        Some(id),
    )
    .await?;
    if let Some(existing) = overlapping.first() {
        tx.rollback().await.map_err(tx_error)?;
        return Ok(BookingOutcome::Rejected(ConflictResult {
            has_conflict: true,
            within_availability: true,
            conflicting_appointment_id: Some(existing.id),
            message: Some("Time slot was taken by a concurrent booking".into()),
        }));
    }
    let updated =
        AppointmentRepository::update_times(&mut tx, id, change.start_time, end_time).await?;
    tx.commit().await.map_err(tx_error)?;

    info!(appointment_id = %updated.id, "appointment rescheduled");
    invalidate_span(cache, current.start_time, current.end_time);
    invalidate_span(cache, updated.start_time, updated.end_time);
    Ok(BookingOutcome::Booked(updated))
}

/// Change an appointment's lifecycle status. Reviving a cancelled (or
/// completed / no-show) appointment makes it occupying again, so that
/// transition runs under the same staff-row lock and overlap re-check as a
/// fresh booking; its interval may have been taken in the meantime. Either
/// way the day's availability changes, so the cache entries are dropped.
pub async fn transition_status(
    pool: &PgPool,
    cache: &AvailabilityCache,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<BookingOutcome, DatabaseError> {
    let current = AppointmentRepository::find(pool, id).await?;

    if requires_occupancy_guard(current.status, status) {
        let mut tx = pool.begin().await.map_err(tx_error)?;
        AppointmentRepository::lock_staff_row(&mut tx, current.staff_id).await?;
        let overlapping = AppointmentRepository::occupying_overlapping(
            &mut *tx,
            current.staff_id,
            current.start_time,
            current.end_time,
            Some(id),
        )
        .await?;
        if let Some(existing) = overlapping.first() {
            tx.rollback().await.map_err(tx_error)?;
            return Ok(BookingOutcome::Rejected(ConflictResult {
                has_conflict: true,
                within_availability: true,
                conflicting_appointment_id: Some(existing.id),
                message: Some("Interval is now occupied by another appointment".into()),
            }));
        }
        let updated = AppointmentRepository::update_status(&mut *tx, id, status).await?;
        tx.commit().await.map_err(tx_error)?;

        info!(appointment_id = %updated.id, status = ?status, "appointment status changed");
        invalidate_span(cache, updated.start_time, updated.end_time);
        return Ok(BookingOutcome::Booked(updated));
    }

    let updated = AppointmentRepository::update_status(pool, id, status).await?;
    invalidate_span(cache, updated.start_time, updated.end_time);
    Ok(BookingOutcome::Booked(updated))
}

fn invalidate_span(cache: &AvailabilityCache, start: OffsetDateTime, end: OffsetDateTime) {
    cache.invalidate_date(start.date());
    if end.date() != start.date() {
        cache.invalidate_date(end.date());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn w(start: u16, end: u16) -> DayWindow {
        DayWindow::new(start, end)
    }

    fn appointment(
        start: OffsetDateTime,
        end: OffsetDateTime,
        status: AppointmentStatus,
    ) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            status,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn booked_time_is_carved_out_of_a_split_shift() {
        // Business 09:00-18:00, staff 09:00-13:00 / 14:00-18:00, one
        // confirmed 10:00-10:30 booking.
        let (day_start, day_end) = day_bounds(date!(2026 - 03 - 02));
        let open = vec![w(540, 780), w(840, 1080)];
        let booked = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Confirmed,
        );
        assert_eq!(
            carve_occupancy(&open, &[booked], day_start, day_end),
            vec![w(540, 600), w(630, 780), w(840, 1080)]
        );
    }

    #[test]
    fn appointment_spanning_midnight_is_clamped_to_the_day() {
        // Runs 23:00 the previous evening through 01:00; only the 00:00-01:00
        // part blocks the queried day.
        let (day_start, day_end) = day_bounds(date!(2026 - 03 - 03));
        let open = vec![w(0, 120)];
        let overnight = appointment(
            datetime!(2026-03-02 23:00 UTC),
            datetime!(2026-03-03 01:00 UTC),
            AppointmentStatus::Pending,
        );
        assert_eq!(
            carve_occupancy(&open, &[overnight], day_start, day_end),
            vec![w(60, 120)]
        );
    }

    #[test]
    fn appointment_running_past_day_end_blocks_until_midnight() {
        let (day_start, day_end) = day_bounds(date!(2026 - 03 - 02));
        let open = vec![w(1320, 1440)];
        let late = appointment(
            datetime!(2026-03-02 23:00 UTC),
            datetime!(2026-03-03 01:00 UTC),
            AppointmentStatus::Confirmed,
        );
        assert!(carve_occupancy(&open, &[late], day_start, day_end).is_empty());
    }

    #[test]
    fn reviving_an_appointment_needs_the_booking_guard() {
        use AppointmentStatus::*;
        // Back into an occupying state from a non-occupying one.
        assert!(requires_occupancy_guard(Cancelled, Confirmed));
        assert!(requires_occupancy_guard(Completed, Pending));
        assert!(requires_occupancy_guard(NoShow, Confirmed));
        // Already occupying, or leaving occupancy: plain update.
        assert!(!requires_occupancy_guard(Pending, Confirmed));
        assert!(!requires_occupancy_guard(Confirmed, Cancelled));
        assert!(!requires_occupancy_guard(Confirmed, Completed));
        assert!(!requires_occupancy_guard(Cancelled, NoShow));
    }
}
