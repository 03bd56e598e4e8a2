use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::Time;
use uuid::Uuid;

/// One open window within a day, local wall-clock times, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: Time,
    pub end: Time,
}

/// A staff member's recurring hours for one weekday. Split shifts are
/// multiple entries in `time_slots`; an absent row means the staff member
/// does not work that weekday at all.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct StaffWorkingHours {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub weekday: i16,
    pub enabled: bool,
    pub time_slots: Json<Vec<TimeSlot>>,
}
