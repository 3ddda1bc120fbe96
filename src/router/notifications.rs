//! Notification route handlers

use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

use crate::notify::Notification;

/// Creates routes for notification operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id", delete(dismiss_notification))
}

/// Endpoint: GET /notifications
async fn list_notifications(State(state): State<SharedState>) -> Json<Vec<Notification>> {
    Json(state.notifications.active())
}

/// Endpoint: DELETE /notifications/:id
async fn dismiss_notification(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.notifications.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
