use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, state::AppState};

use super::dto::{MarkAllReadResponse, Notification};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/:id/read", put(mark_read))
}

#[instrument(skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Notification>>, (StatusCode, String)> {
    let items = state
        .notifications
        .list_for_user(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "list notifications failed");
            internal()
        })?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let found = state
        .notifications
        .mark_read(user_id, id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, %id, "mark notification read failed");
            internal()
        })?;
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Notification not found".into()))
    }
}

#[instrument(skip(state))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MarkAllReadResponse>, (StatusCode, String)> {
    let count = state
        .notifications
        .mark_all_read(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "mark all notifications read failed");
            internal()
        })?;
    Ok(Json(MarkAllReadResponse { count }))
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable".to_string())
}
