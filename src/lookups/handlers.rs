//! REST API handlers for lookup lists

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::api::{ApiError, AvailableDoctorQuery, BranchQuery};
use crate::notify::{Notification, Notifier};
use crate::state::SharedState;

/// Creates routes for lookup lists
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/lookups/branches", get(list_branches))
        .route("/lookups/doctors", get(list_doctors))
}

fn lookup_failed(state: &SharedState, error: ApiError) -> Response {
    let message = error.user_message();
    state.notifications.notify(Notification::error(message.clone()));
    (StatusCode::BAD_GATEWAY, Json(json!({ "message": message }))).into_response()
}

/// Endpoint: GET /lookups/branches?keyword=
async fn list_branches(
    State(state): State<SharedState>,
    Query(query): Query<BranchQuery>,
) -> Response {
    match state.lookups.all_branches(&query).await {
        Ok(branches) => Json(branches).into_response(),
        Err(e) => lookup_failed(&state, e),
    }
}

/// Endpoint: GET /lookups/doctors?branchId=&date=&time=
async fn list_doctors(
    State(state): State<SharedState>,
    Query(query): Query<AvailableDoctorQuery>,
) -> Response {
    match state.lookups.available_doctors(&query).await {
        Ok(doctors) => Json(doctors).into_response(),
        Err(e) => lookup_failed(&state, e),
    }
}
