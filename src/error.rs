use axum::http::StatusCode;
use thiserror::Error;

/// A request field that could not be accepted.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no current plan to regenerate from")]
    NoCurrentPlan,

    #[error("plan not found")]
    NotFound,

    #[error("storage failure: {0:#}")]
    Persistence(anyhow::Error),
}

impl PlanError {
    pub fn status(&self) -> StatusCode {
        match self {
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::NoCurrentPlan | PlanError::NotFound => StatusCode::NOT_FOUND,
            PlanError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body sent for storage failures; the error chain stays in the logs.
const STORAGE_MESSAGE: &str = "storage unavailable";

impl From<PlanError> for (StatusCode, String) {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Persistence(_) => (e.status(), STORAGE_MESSAGE.to_string()),
            e => (e.status(), e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("recipe not found")]
    NotFound,

    #[error("only moderators can change recipe status")]
    Forbidden,

    #[error("storage failure: {0:#}")]
    Persistence(anyhow::Error),
}

impl RecipeError {
    pub fn status(&self) -> StatusCode {
        match self {
            RecipeError::Validation(_) => StatusCode::BAD_REQUEST,
            RecipeError::NotFound => StatusCode::NOT_FOUND,
            RecipeError::Forbidden => StatusCode::FORBIDDEN,
            RecipeError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecipeError> for (StatusCode, String) {
    fn from(e: RecipeError) -> Self {
        match e {
            RecipeError::Persistence(_) => (e.status(), STORAGE_MESSAGE.to_string()),
            e => (e.status(), e.to_string()),
        }
    }
}
