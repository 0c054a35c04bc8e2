//! Turns loosely shaped stored recipes into typed [`Recipe`]s and recipes
//! into planner [`Meal`]s. The planner does no defaulting of its own, so
//! everything that reaches the catalog passes through here first.

use std::collections::BTreeSet;

use crate::meals::{Ingredient, Meal, MealType};

use super::{
    dto::{Recipe, RecipeStatus, RecipeType},
    repo_types::{RecipeIngredientBody, RecipeRow},
};

const UNTITLED: &str = "Untitled recipe";

/// Missing, negative and non-finite amounts read as zero.
fn amount_of(v: Option<f64>) -> f64 {
    match v {
        Some(x) if x.is_finite() && x > 0.0 => x,
        _ => 0.0,
    }
}

fn whole(v: Option<f64>) -> u32 {
    amount_of(v).round().min(f64::from(u32::MAX)) as u32
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `None` for entries without any name.
fn ingredient(raw: RecipeIngredientBody) -> Option<Ingredient> {
    let name = non_blank(raw.name).or_else(|| non_blank(raw.item))?;
    let amount = raw
        .quantity
        .or(raw.amount)
        .map(|q| q.into_text())
        .unwrap_or_default();
    let quantity = match non_blank(raw.unit) {
        Some(unit) if !amount.is_empty() => format!("{amount} {unit}"),
        Some(unit) => unit,
        None => amount,
    };
    Some(Ingredient {
        name,
        quantity,
        price: amount_of(raw.price),
    })
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        let body = row.body.0;

        let name = non_blank(body.name)
            .or_else(|| non_blank(body.title))
            .unwrap_or_else(|| UNTITLED.to_string());

        // unknown or missing types land in the dinner slot
        let recipe_type = body
            .recipe_type
            .as_deref()
            .map(str::trim)
            .map(str::to_lowercase)
            .and_then(|t| t.parse::<RecipeType>().ok())
            .unwrap_or(RecipeType::Dinner);

        let tags: BTreeSet<String> = body.tags.unwrap_or_default().into_iter().collect();

        let ingredients = body
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .filter_map(ingredient)
            .collect();

        Recipe {
            id: row.id,
            author_id: row.author_id,
            author_name: row.author_name,
            name,
            description: body.description.unwrap_or_default(),
            recipe_type,
            prep_time: whole(body.prep_time),
            cook_time: whole(body.cook_time),
            servings: whole(body.servings).max(1),
            calories: whole(body.calories),
            protein: amount_of(body.protein),
            carbs: amount_of(body.carbs),
            fat: amount_of(body.fat),
            fiber: amount_of(body.fiber),
            price: amount_of(body.price),
            tags,
            ingredients,
            instructions: body.instructions.unwrap_or_default(),
            status: row.status.parse().unwrap_or(RecipeStatus::Draft),
            likes: row.likes.max(0) as u32,
            liked_by: row.liked_by,
            comments: row.comments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn slot_for(recipe_type: RecipeType) -> MealType {
    match recipe_type {
        RecipeType::Breakfast => MealType::Breakfast,
        RecipeType::Lunch => MealType::Lunch,
        RecipeType::Dinner => MealType::Dinner,
        RecipeType::Snack | RecipeType::Dessert => MealType::Snack,
    }
}

/// Planner view of a recipe. Desserts are scheduled as snacks.
pub fn recipe_to_meal(recipe: &Recipe) -> Meal {
    Meal {
        id: recipe.id.to_string(),
        name: recipe.name.clone(),
        meal_type: slot_for(recipe.recipe_type),
        calories: recipe.calories,
        protein: recipe.protein,
        carbs: recipe.carbs,
        fat: recipe.fat,
        fiber: recipe.fiber,
        price: recipe.price,
        prep_time: recipe.prep_time,
        tags: recipe.tags.clone(),
        ingredients: recipe.ingredients.clone(),
    }
}
