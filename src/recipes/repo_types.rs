use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::Comment;

/// Recipe content as stored in the `body` JSONB column. Imported documents
/// are loose: `title` next to or instead of `name`, `budgetPrice` for
/// `price`, numbers that may be missing, negative or fractional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeBody {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub recipe_type: Option<String>,
    pub prep_time: Option<f64>,
    pub cook_time: Option<f64>,
    pub servings: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    #[serde(alias = "budgetPrice")]
    pub price: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<RecipeIngredientBody>>,
    pub instructions: Option<Vec<String>>,
}

/// One stored ingredient. Imports write `{item, amount, unit}` where
/// submissions write `{name, quantity, price}`; every field may be absent
/// or null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecipeIngredientBody {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub quantity: Option<LooseText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<LooseText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub price: Option<f64>,
}

/// A label that imports store either as text or as a bare number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseText {
    Text(String),
    Number(f64),
}

impl LooseText {
    pub fn into_text(self) -> String {
        match self {
            LooseText::Text(s) => s.trim().to_string(),
            LooseText::Number(n) if n.is_finite() => n.to_string(),
            LooseText::Number(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub status: String,
    pub likes: i32,
    pub liked_by: Vec<Uuid>,
    pub comments: Json<Vec<Comment>>,
    pub body: Json<RecipeBody>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
