use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::PlanError, state::AppState};

use super::{
    dto::{GeneratePlanRequest, GeneratePlanResponse, StoredPlan},
    services::{self, GenerateOutcome},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/generate", post(generate_plan))
        .route("/plans/regenerate", post(regenerate_plan))
        .route("/plans/current", get(current_plan))
        .route("/plans/:id/current", put(mark_current))
        .route("/plans/:id", delete(delete_plan))
}

fn reject(e: PlanError) -> (StatusCode, String) {
    if let PlanError::Persistence(inner) = &e {
        error!(error = %format!("{inner:#}"), "plan storage failure");
    }
    e.into()
}

const UNSAVED_MESSAGE: &str = "plan could not be saved; try again later";

/// 201 with the saved plan, or 503 with the unsaved plan. The storage error
/// itself is logged, not returned.
fn respond(outcome: GenerateOutcome) -> (StatusCode, Json<GeneratePlanResponse>) {
    match outcome {
        GenerateOutcome::Saved { id, plan } => (
            StatusCode::CREATED,
            Json(GeneratePlanResponse {
                id: Some(id),
                within_budget: plan.within_budget(),
                plan,
                error: None,
            }),
        ),
        GenerateOutcome::Unsaved { plan, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(GeneratePlanResponse {
                id: None,
                within_budget: plan.within_budget(),
                plan,
                error: Some(UNSAVED_MESSAGE.to_string()),
            }),
        ),
    }
}

#[instrument(skip(state, body))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GeneratePlanRequest>,
) -> Result<(StatusCode, Json<GeneratePlanResponse>), (StatusCode, String)> {
    let outcome = services::generate(&state, user_id, body).await.map_err(reject)?;
    Ok(respond(outcome))
}

#[instrument(skip(state))]
pub async fn regenerate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<(StatusCode, Json<GeneratePlanResponse>), (StatusCode, String)> {
    let outcome = services::regenerate(&state, user_id).await.map_err(reject)?;
    Ok(respond(outcome))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<StoredPlan>>, (StatusCode, String)> {
    let plans = services::list_plans(&state, user_id).await.map_err(reject)?;
    Ok(Json(plans))
}

/// `null` when the user has no current plan.
#[instrument(skip(state))]
pub async fn current_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Option<StoredPlan>>, (StatusCode, String)> {
    let plan = services::current_plan(&state, user_id).await.map_err(reject)?;
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn mark_current(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::mark_current(&state, user_id, id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::delete_plan(&state, user_id, id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{PlanPreferences, WeeklyPlan};

    fn empty_plan() -> WeeklyPlan {
        WeeklyPlan {
            weekly_plan: vec![],
            total_weekly_cost: 0.0,
            total_weekly_calories: 0,
            preferences: PlanPreferences::default(),
        }
    }

    #[test]
    fn unsaved_plan_hides_storage_details() {
        let inner = anyhow::anyhow!("password authentication failed").context("insert plan");
        let (status, Json(body)) = respond(GenerateOutcome::Unsaved {
            plan: empty_plan(),
            error: PlanError::Persistence(inner),
        });
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.id, None);
        assert_eq!(body.error.as_deref(), Some(UNSAVED_MESSAGE));
    }

    #[test]
    fn saved_plan_is_created() {
        let id = Uuid::new_v4();
        let (status, Json(body)) = respond(GenerateOutcome::Saved { id, plan: empty_plan() });
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.id, Some(id));
        assert!(body.error.is_none());
    }
}
