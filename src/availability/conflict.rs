//! Pure conflict decision for a proposed booking: containment within the
//! day's effective windows plus a half-open overlap scan over the occupying
//! appointments already loaded for that staff member and date.

use serde::Serialize;
use time::{Duration, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::availability::interval::{minutes_of, DayWindow, DAY_END_MIN};
use crate::db::Appointment;

#[derive(Debug, Clone)]
pub struct ProposedBooking {
    pub staff_id: Uuid,
    pub start: OffsetDateTime,
    pub duration_minutes: i64,
    /// Set when rescheduling, so the appointment being moved does not
    /// conflict with itself.
    pub exclude_appointment_id: Option<Uuid>,
}

impl ProposedBooking {
    pub fn end(&self) -> OffsetDateTime {
        self.start + Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictResult {
    pub has_conflict: bool,
    pub within_availability: bool,
    pub conflicting_appointment_id: Option<Uuid>,
    pub message: Option<String>,
}

impl ConflictResult {
    fn clear() -> Self {
        Self {
            has_conflict: false,
            within_availability: true,
            conflicting_appointment_id: None,
            message: None,
        }
    }

    fn outside_hours() -> Self {
        Self {
            has_conflict: true,
            within_availability: false,
            conflicting_appointment_id: None,
            message: Some("Requested time is outside working hours".into()),
        }
    }

    fn overlapping(existing: &Appointment) -> Self {
        Self {
            has_conflict: true,
            within_availability: true,
            conflicting_appointment_id: Some(existing.id),
            message: Some(format!(
                "Overlaps an existing appointment from {} to {}",
                existing.start_time, existing.end_time
            )),
        }
    }
}

/// Decide whether `proposed` can be booked. `windows` are the staff
/// member's effective windows for the proposal's date; `occupying` must be
/// sorted by (start_time, id) so the earliest-starting overlap is the one
/// cited.
pub fn check(
    windows: &[DayWindow],
    occupying: &[Appointment],
    proposed: &ProposedBooking,
) -> ConflictResult {
    if !fits_in_windows(windows, proposed) {
        return ConflictResult::outside_hours();
    }

    let end = proposed.end();
    for existing in occupying {
        if Some(existing.id) == proposed.exclude_appointment_id {
            continue;
        }
        if !existing.status.is_occupying() {
            continue;
        }
        // Half-open intervals: touching end-to-start is not a conflict.
        if existing.start_time < end && proposed.start < existing.end_time {
            return ConflictResult::overlapping(existing);
        }
    }
    ConflictResult::clear()
}

/// The proposal must lie entirely inside a single effective window on its
/// own calendar day; spilling past midnight or across a gap fails. Windows
/// are UTC minute-of-day, so the proposal is normalized to UTC first.
fn fits_in_windows(windows: &[DayWindow], proposed: &ProposedBooking) -> bool {
    let start_min = minutes_of(proposed.start.to_offset(UtcOffset::UTC).time()) as i64;
    let end_min = start_min + proposed.duration_minutes;
    if end_min > DAY_END_MIN as i64 {
        return false;
    }
    let wanted = DayWindow::new(start_min as u16, end_min as u16);
    windows.iter().any(|w| w.contains(&wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AppointmentStatus;
    use time::macros::datetime;

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

    fn proposal(start: OffsetDateTime, duration_minutes: i64) -> ProposedBooking {
        ProposedBooking {
            staff_id: Uuid::new_v4(),
            start,
            duration_minutes,
            exclude_appointment_id: None,
        }
    }

    // Monday 09:00-13:00 / 14:00-18:00 split shift.
    fn split_shift() -> Vec<DayWindow> {
        vec![w(540, 780), w(840, 1080)]
    }

    #[test]
    fn overlapping_booking_cites_the_existing_appointment() {
        let existing = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Confirmed,
        );
        let result = check(
            &split_shift(),
            &[existing.clone()],
            &proposal(datetime!(2026-03-02 10:15 UTC), 30),
        );
        assert!(result.has_conflict);
        assert!(result.within_availability);
        assert_eq!(result.conflicting_appointment_id, Some(existing.id));
    }

    #[test]
    fn back_to_back_booking_is_not_a_conflict() {
        let existing = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Confirmed,
        );
        let result = check(
            &split_shift(),
            &[existing],
            &proposal(datetime!(2026-03-02 10:30 UTC), 30),
        );
        assert!(!result.has_conflict);
        assert!(result.within_availability);
    }

    #[test]
    fn lunch_gap_is_outside_working_hours() {
        let result = check(
            &split_shift(),
            &[],
            &proposal(datetime!(2026-03-02 13:15 UTC), 30),
        );
        assert!(result.has_conflict);
        assert!(!result.within_availability);
        assert!(result.conflicting_appointment_id.is_none());
    }

    #[test]
    fn booking_spilling_past_closing_is_outside_hours() {
        let result = check(
            &split_shift(),
            &[],
            &proposal(datetime!(2026-03-02 17:45 UTC), 30),
        );
        assert!(!result.within_availability);
    }

    #[test]
    fn cancelled_and_completed_appointments_do_not_block() {
        let cancelled = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Cancelled,
        );
        let completed = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 11:00 UTC),
            AppointmentStatus::Completed,
        );
        let result = check(
            &split_shift(),
            &[cancelled, completed],
            &proposal(datetime!(2026-03-02 10:15 UTC), 30),
        );
        assert!(!result.has_conflict);
    }

    #[test]
    fn earliest_starting_overlap_is_the_one_reported() {
        let mut first = appointment(
            datetime!(2026-03-02 09:30 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Pending,
        );
        let mut second = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 11:00 UTC),
            AppointmentStatus::Confirmed,
        );
        // Sorted by (start_time, id), as the occupancy loader returns them.
        first.id = Uuid::from_u128(1);
        second.id = Uuid::from_u128(2);
        let result = check(
            &split_shift(),
            &[first.clone(), second],
            &proposal(datetime!(2026-03-02 10:00 UTC), 60),
        );
        assert_eq!(result.conflicting_appointment_id, Some(first.id));
    }

    #[test]
    fn offset_start_times_are_judged_in_utc() {
        // 13:15+03:00 is 10:15 UTC: inside the morning shift and on top of
        // the 10:00-10:30 booking, not in the lunch gap.
        let existing = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Confirmed,
        );
        let result = check(
            &split_shift(),
            &[existing.clone()],
            &proposal(datetime!(2026-03-02 13:15 +03:00), 30),
        );
        assert!(result.within_availability);
        assert_eq!(result.conflicting_appointment_id, Some(existing.id));
    }

    #[test]
    fn excluded_appointment_does_not_conflict_with_itself() {
        let existing = appointment(
            datetime!(2026-03-02 10:00 UTC),
            datetime!(2026-03-02 10:30 UTC),
            AppointmentStatus::Confirmed,
        );
        let mut proposed = proposal(datetime!(2026-03-02 10:00 UTC), 45);
        proposed.exclude_appointment_id = Some(existing.id);
        let result = check(&split_shift(), &[existing], &proposed);
        assert!(!result.has_conflict);
    }
}
