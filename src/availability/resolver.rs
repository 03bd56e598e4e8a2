//! Effective open windows for one date: weekly business hours, holiday
//! overrides, per-staff weekly hours, and per-staff date overrides folded
//! into a single ordered window set.

use crate::availability::interval::{self, DayWindow};
use crate::db::{BusinessDay, HolidayException, StaffScheduleException, StaffWorkingHours, TimeSlot};

/// Everything the resolver needs for one (date, staff?) query, already
/// loaded from the store. The resolver itself never performs I/O.
#[derive(Debug, Default)]
pub struct DaySchedule<'a> {
    pub business_day: Option<&'a BusinessDay>,
    pub holiday: Option<&'a HolidayException>,
    /// Present iff the query named a staff member.
    pub staff: Option<StaffDaySchedule<'a>>,
}

#[derive(Debug, Default)]
pub struct StaffDaySchedule<'a> {
    pub weekly: Option<&'a StaffWorkingHours>,
    pub exception: Option<&'a StaffScheduleException>,
}

pub fn slots_to_windows(slots: &[TimeSlot]) -> Vec<DayWindow> {
    interval::normalize(
        slots
            .iter()
            .map(|s| DayWindow::from_times(s.start, s.end))
            .collect(),
    )
}

/// Business-side open set: a holiday exception for the date fully replaces
/// the weekly entry; a closed weekday or disabled exception yields nothing.
pub fn business_windows(
    day: Option<&BusinessDay>,
    holiday: Option<&HolidayException>,
) -> Vec<DayWindow> {
    if let Some(ex) = holiday {
        return exception_windows(ex.enabled, ex.time_slots.as_deref());
    }
    match day {
        Some(d) if d.is_open => interval::normalize(vec![DayWindow::from_times(
            d.opens_at, d.closes_at,
        )]),
        _ => Vec::new(),
    }
}

/// Staff-side open set: a date exception fully replaces the weekly row; no
/// weekly row means the staff member is unavailable that weekday.
pub fn staff_windows(
    weekly: Option<&StaffWorkingHours>,
    exception: Option<&StaffScheduleException>,
) -> Vec<DayWindow> {
    if let Some(ex) = exception {
        return exception_windows(ex.enabled, ex.time_slots.as_deref());
    }
    match weekly {
        Some(w) if w.enabled => slots_to_windows(&w.time_slots),
        _ => Vec::new(),
    }
}

fn exception_windows(enabled: bool, slots: Option<&Vec<TimeSlot>>) -> Vec<DayWindow> {
    if !enabled {
        return Vec::new();
    }
    slots.map(|s| slots_to_windows(s)).unwrap_or_default()
}

/// The intersection of business and staff open sets when a staff member was
/// named; business hours alone otherwise. Ordered, non-overlapping; empty
/// means closed.
pub fn effective_windows(schedule: &DaySchedule<'_>) -> Vec<DayWindow> {
    let business = business_windows(schedule.business_day, schedule.holiday);
    match &schedule.staff {
        Some(staff) => {
            let staff = staff_windows(staff.weekly, staff.exception);
            interval::intersect_sets(&business, &staff)
        }
        None => business,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use time::macros::{date, time};
    use uuid::Uuid;

    fn business(open: bool, opens: time::Time, closes: time::Time) -> BusinessDay {
        BusinessDay {
            weekday: 1,
            opens_at: opens,
            closes_at: closes,
            is_open: open,
        }
    }

    fn weekly(enabled: bool, slots: Vec<TimeSlot>) -> StaffWorkingHours {
        StaffWorkingHours {
            id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            weekday: 1,
            enabled,
            time_slots: Json(slots),
        }
    }

    fn slot(start: time::Time, end: time::Time) -> TimeSlot {
        TimeSlot { start, end }
    }

    fn w(start: u16, end: u16) -> DayWindow {
        DayWindow::new(start, end)
    }

    #[test]
    fn closed_weekday_yields_nothing() {
        let day = business(false, time!(09:00), time!(18:00));
        assert!(business_windows(Some(&day), None).is_empty());
        assert!(business_windows(None, None).is_empty());
    }

    #[test]
    fn holiday_exception_replaces_weekly_entry() {
        let day = business(true, time!(09:00), time!(18:00));
        let holiday = HolidayException {
            id: Uuid::new_v4(),
            date: date!(2026 - 01 - 01),
            enabled: true,
            time_slots: Some(Json(vec![slot(time!(10:00), time!(14:00))])),
            reason: Some("New Year".into()),
        };
        assert_eq!(
            business_windows(Some(&day), Some(&holiday)),
            vec![w(600, 840)]
        );
    }

    #[test]
    fn disabled_holiday_closes_an_otherwise_open_day() {
        let day = business(true, time!(09:00), time!(18:00));
        let holiday = HolidayException {
            id: Uuid::new_v4(),
            date: date!(2026 - 05 - 01),
            enabled: false,
            time_slots: None,
            reason: None,
        };
        assert!(business_windows(Some(&day), Some(&holiday)).is_empty());
    }

    #[test]
    fn missing_weekly_row_means_staff_unavailable() {
        assert!(staff_windows(None, None).is_empty());
    }

    #[test]
    fn disabled_staff_exception_overrides_weekly_hours() {
        let hours = weekly(true, vec![slot(time!(09:00), time!(18:00))]);
        let ex = StaffScheduleException {
            id: Uuid::new_v4(),
            staff_id: hours.staff_id,
            date: date!(2026 - 03 - 02),
            enabled: false,
            time_slots: None,
            reason: Some("sick leave".into()),
        };
        assert!(staff_windows(Some(&hours), Some(&ex)).is_empty());
    }

    #[test]
    fn split_shift_intersects_with_business_hours() {
        let day = business(true, time!(09:00), time!(18:00));
        let hours = weekly(
            true,
            vec![
                slot(time!(09:00), time!(13:00)),
                slot(time!(14:00), time!(18:00)),
            ],
        );
        let schedule = DaySchedule {
            business_day: Some(&day),
            holiday: None,
            staff: Some(StaffDaySchedule {
                weekly: Some(&hours),
                exception: None,
            }),
        };
        assert_eq!(
            effective_windows(&schedule),
            vec![w(540, 780), w(840, 1080)]
        );
    }

    #[test]
    fn staff_hours_outside_business_hours_are_cut() {
        let day = business(true, time!(10:00), time!(16:00));
        let hours = weekly(true, vec![slot(time!(08:00), time!(20:00))]);
        let schedule = DaySchedule {
            business_day: Some(&day),
            holiday: None,
            staff: Some(StaffDaySchedule {
                weekly: Some(&hours),
                exception: None,
            }),
        };
        assert_eq!(effective_windows(&schedule), vec![w(600, 960)]);
    }

    #[test]
    fn resolver_is_idempotent() {
        let day = business(true, time!(09:00), time!(18:00));
        let hours = weekly(true, vec![slot(time!(09:00), time!(13:00))]);
        let schedule = DaySchedule {
            business_day: Some(&day),
            holiday: None,
            staff: Some(StaffDaySchedule {
                weekly: Some(&hours),
                exception: None,
            }),
        };
        assert_eq!(effective_windows(&schedule), effective_windows(&schedule));
    }
}
