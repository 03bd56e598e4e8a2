use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::availability::conflict::{ConflictResult, ProposedBooking};
use crate::availability::service::{self, BookingOutcome};
use crate::db::{
    Appointment, CatalogRepository, NewAppointment, RescheduleAppointment,
    UpdateAppointmentStatus,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct ConflictCheckRequest {
    pub staff_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// One of `duration_minutes` or `service_id` must be supplied.
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: Option<i64>,
    pub service_id: Option<Uuid>,
    pub exclude_appointment_id: Option<Uuid>,
}

/// Dry-run conflict check; never writes. Callers still go through the
/// transactional guard when they book.
pub async fn check_conflict(
    State(state): State<AppState>,
    Json(request): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictResult>, AppError> {
    request.validate()?;
    let duration_minutes = match (request.duration_minutes, request.service_id) {
        (Some(minutes), _) => minutes,
        (None, Some(service_id)) => {
            CatalogRepository::service_by_id(&state.db, service_id)
                .await?
                .duration_minutes as i64
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either duration_minutes or service_id is required".into(),
            ))
        }
    };

    let proposed = ProposedBooking {
        staff_id: request.staff_id,
        start: request.start_time,
        duration_minutes,
        exclude_appointment_id: request.exclude_appointment_id,
    };
    let result = service::check_conflict(&state.db, &proposed).await?;
    Ok(Json(result))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(new): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    new.validate()?;
    match service::create_appointment(&state.db, &state.availability_cache, &new).await? {
        BookingOutcome::Booked(appointment) => Ok((StatusCode::CREATED, Json(appointment))),
        BookingOutcome::Rejected(conflict) => Err(AppError::Conflict(conflict)),
    }
}

pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(change): Json<RescheduleAppointment>,
) -> Result<Json<Appointment>, AppError> {
    change.validate()?;
    match service::reschedule_appointment(&state.db, &state.availability_cache, id, &change)
        .await?
    {
        BookingOutcome::Booked(appointment) => Ok(Json(appointment)),
        BookingOutcome::Rejected(conflict) => Err(AppError::Conflict(conflict)),
    }
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateAppointmentStatus>,
) -> Result<Json<Appointment>, AppError> {
    match service::transition_status(&state.db, &state.availability_cache, id, update.status)
        .await?
    {
        BookingOutcome::Booked(appointment) => Ok(Json(appointment)),
        BookingOutcome::Rejected(conflict) => Err(AppError::Conflict(conflict)),
    }
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = crate::db::AppointmentRepository::find(&state.db, id).await?;
    Ok(Json(appointment))
}
