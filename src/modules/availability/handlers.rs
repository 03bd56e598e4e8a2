use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use time::macros::format_description;
use time::Date;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::availability::interval::DayWindow;
use crate::availability::service::{self, AvailabilityBundle};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub staff_id: Option<Uuid>,
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {raw}")))
}

/// Full calendar payload for one day: business hours, staff schedule,
/// occupying appointments, exceptions, and the open slots.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityBundle>, AppError> {
    let date = parse_date(&query.date)?;
    let bundle = service::availability_bundle(
        &state.db,
        &state.availability_cache,
        date,
        query.staff_id,
    )
    .await?;
    Ok(Json(bundle))
}

/// The recurring weekly business hours, one entry per weekday.
pub async fn get_business_days(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::db::BusinessDay>>, AppError> {
    let days = crate::db::ScheduleRepository::business_days(&state.db).await?;
    Ok(Json(days))
}

/// Just the open, bookable windows for a day.
pub async fn get_open_slots(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<DayWindow>>, AppError> {
    let date = parse_date(&query.date)?;
    let slots = service::resolve_daily_availability(&state.db, date, query.staff_id).await?;
    Ok(Json(slots))
}
