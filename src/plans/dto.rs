use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::planner::{PreferenceInput, WeeklyPlan};

/// Body of `POST /plans/generate`; every field falls back to its default.
pub type GeneratePlanRequest = PreferenceInput;

/// A persisted weekly plan. Plan fields are flattened so clients see the
/// same shape the planner produces, plus storage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub plan: WeeklyPlan,
    pub is_current: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanResponse {
    pub id: Option<Uuid>, // None when the plan could not be saved
    pub plan: WeeklyPlan,
    pub within_budget: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
