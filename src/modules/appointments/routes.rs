use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    check_conflict, create_appointment, get_appointment, reschedule_appointment, update_status,
};
use crate::app_state::AppState;

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_appointment))
        .route("/check", post(check_conflict))
        .route("/{id}", get(get_appointment))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/reschedule", patch(reschedule_appointment))
}
