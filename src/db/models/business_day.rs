use serde::{Deserialize, Serialize};
use time::Time;

/// Weekly business hours, one row per weekday (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct BusinessDay {
    pub weekday: i16,
    pub opens_at: Time,
    pub closes_at: Time,
    pub is_open: bool,
}
