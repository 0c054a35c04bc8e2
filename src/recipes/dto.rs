use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::ValidationError, meals::Ingredient};

use super::repo_types::{LooseText, RecipeBody, RecipeIngredientBody};

const MIN_NAME_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    Published,
    Pending,
    Draft,
    Rejected,
}

impl RecipeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecipeStatus::Published => "published",
            RecipeStatus::Pending => "pending",
            RecipeStatus::Draft => "draft",
            RecipeStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(RecipeStatus::Published),
            "pending" => Ok(RecipeStatus::Pending),
            "draft" => Ok(RecipeStatus::Draft),
            "rejected" => Ok(RecipeStatus::Rejected),
            other => anyhow::bail!("unknown recipe status: {}", other),
        }
    }
}

/// Recipe categories. `dessert` has no planner slot of its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipeType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl RecipeType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecipeType::Breakfast => "breakfast",
            RecipeType::Lunch => "lunch",
            RecipeType::Dinner => "dinner",
            RecipeType::Snack => "snack",
            RecipeType::Dessert => "dessert",
        }
    }
}

impl FromStr for RecipeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(RecipeType::Breakfast),
            "lunch" => Ok(RecipeType::Lunch),
            "dinner" => Ok(RecipeType::Dinner),
            "snack" => Ok(RecipeType::Snack),
            "dessert" => Ok(RecipeType::Dessert),
            other => anyhow::bail!("unknown recipe type: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub author_name: Option<String>,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A community recipe after normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub recipe_type: RecipeType,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub price: f64,
    pub tags: BTreeSet<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub status: RecipeStatus,
    pub likes: u32,
    pub liked_by: Vec<Uuid>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub recipe_type: String,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub price: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub author_name: Option<String>,
}

impl CreateRecipeRequest {
    /// Checks a submission and trims it into the stored body.
    pub fn validate(self) -> Result<RecipeBody, ValidationError> {
        let name = self.name.trim().to_string();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(ValidationError::new(
                "name",
                format!("must be at least {MIN_NAME_LEN} characters"),
            ));
        }

        let description = self.description.trim().to_string();
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(ValidationError::new(
                "description",
                format!("must be at least {MIN_DESCRIPTION_LEN} characters"),
            ));
        }

        let recipe_type: RecipeType = self
            .recipe_type
            .trim()
            .parse()
            .map_err(|_| ValidationError::new("type", "must be breakfast, lunch, dinner, snack or dessert"))?;

        let prep_time = non_negative_minutes("prepTime", self.prep_time)?;
        let cook_time = non_negative_minutes("cookTime", self.cook_time)?;

        let ingredients: Vec<RecipeIngredientBody> = self
            .ingredients
            .into_iter()
            .filter(|i| !i.name.trim().is_empty())
            .map(|i| RecipeIngredientBody {
                name: Some(i.name.trim().to_string()),
                quantity: Some(LooseText::Text(i.quantity.trim().to_string())),
                price: Some(i.price.max(0.0)),
                ..Default::default()
            })
            .collect();
        if ingredients.is_empty() {
            return Err(ValidationError::new("ingredients", "at least one ingredient is required"));
        }

        let instructions: Vec<String> = self
            .instructions
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if instructions.is_empty() {
            return Err(ValidationError::new("instructions", "at least one instruction step is required"));
        }

        let tags = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(RecipeBody {
            name: Some(name),
            title: None,
            description: Some(description),
            recipe_type: Some(recipe_type.as_str().to_string()),
            prep_time: Some(prep_time as f64),
            cook_time: Some(cook_time as f64),
            servings: Some(self.servings.unwrap_or(1).max(1) as f64),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            price: self.price,
            tags: Some(tags),
            ingredients: Some(ingredients),
            instructions: Some(instructions),
        })
    }
}

fn non_negative_minutes(field: &'static str, value: Option<i64>) -> Result<i64, ValidationError> {
    match value {
        Some(v) if v >= 0 => Ok(v),
        Some(_) => Err(ValidationError::new(field, "must not be negative")),
        None => Err(ValidationError::new(field, "is required")),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: RecipeStatus,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub likes: u32,
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    pub text: String,
    pub author_name: Option<String>,
}
