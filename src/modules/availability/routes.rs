use axum::{routing::get, Router};

use super::handlers::{get_availability, get_business_days, get_open_slots};
use crate::app_state::AppState;

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_availability))
        .route("/slots", get(get_open_slots))
        .route("/business-days", get(get_business_days))
}
