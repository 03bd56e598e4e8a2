use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::Date;
use uuid::Uuid;

use super::TimeSlot;

/// Business-wide override for one calendar date. When a row exists it fully
/// replaces the weekly `BusinessDay` entry for that date: `enabled = false`
/// closes the day, otherwise `time_slots` is the day's open set.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct HolidayException {
    pub id: Uuid,
    pub date: Date,
    pub enabled: bool,
    pub time_slots: Option<Json<Vec<TimeSlot>>>,
    pub reason: Option<String>,
}

/// Per-staff override for one calendar date, same replacement semantics as
/// `HolidayException` but against the staff member's weekly hours.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct StaffScheduleException {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub date: Date,
    pub enabled: bool,
    pub time_slots: Option<Json<Vec<TimeSlot>>>,
    pub reason: Option<String>,
}
