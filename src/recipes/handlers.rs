use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::RecipeError, state::AppState};

use super::{
    dto::{Comment, CreateRecipeRequest, LikeResponse, NewCommentRequest, Recipe, StatusResponse, UpdateStatusRequest},
    services,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/mine", get(list_my_recipes))
        .route("/recipes/:id/status", put(update_status))
        .route("/recipes/:id/like", post(toggle_like))
        .route("/recipes/:id/comments", post(add_comment))
}

fn reject(e: RecipeError) -> (StatusCode, String) {
    if let RecipeError::Persistence(inner) = &e {
        error!(error = %format!("{inner:#}"), "recipe storage failure");
    }
    e.into()
}

/// Public catalog of published recipes.
#[instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, (StatusCode, String)> {
    let recipes = state
        .recipes
        .list_published()
        .await
        .map_err(|e| reject(RecipeError::Persistence(e)))?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn list_my_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Recipe>>, (StatusCode, String)> {
    let recipes = state
        .recipes
        .list_published_by(user_id)
        .await
        .map_err(|e| reject(RecipeError::Persistence(e)))?;
    Ok(Json(recipes))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<Recipe>), (StatusCode, String)> {
    let recipe = services::submit(&state, user_id, body).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let recipe = services::set_status(&state, user_id, id, &body.status)
        .await
        .map_err(reject)?;
    Ok(Json(StatusResponse {
        id: recipe.id,
        status: recipe.status,
    }))
}

#[instrument(skip(state))]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, (StatusCode, String)> {
    let res = services::toggle_like(&state, user_id, id).await.map_err(reject)?;
    Ok(Json(res))
}

#[instrument(skip(state, body))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), (StatusCode, String)> {
    let comment = services::add_comment(&state, user_id, id, body)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(comment)))
}
