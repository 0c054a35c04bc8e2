use std::{collections::HashSet, sync::Arc};

use anyhow::Context;

use super::model::Meal;

const STATIC_MEALS_JSON: &str = include_str!("../../data/static_meals.json");

/// Bundled fallback meals, available even when no community recipe is published.
pub fn static_meals() -> anyhow::Result<Vec<Meal>> {
    serde_json::from_str(STATIC_MEALS_JSON).context("parse bundled static meals")
}

/// Immutable pool of candidate meals for one planning run.
///
/// Recipe-sourced meals come first, then the static fallback list. Both are
/// eligible for every planning tier; order only matters for ties.
#[derive(Debug, Clone, Default)]
pub struct MealCatalog {
    meals: Vec<Arc<Meal>>,
}

impl MealCatalog {
    pub fn merge(recipe_meals: Vec<Meal>, fallback: Vec<Meal>) -> Self {
        let meals = recipe_meals
            .into_iter()
            .chain(fallback)
            .map(Arc::new)
            .collect();
        Self { meals }
    }

    pub fn meals(&self) -> &[Arc<Meal>] {
        &self.meals
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    /// Meals named by `ids`, in the order the ids were given. Unknown and
    /// repeated ids are skipped; the first catalog entry wins on id clashes.
    pub fn select(&self, ids: &[String]) -> Vec<Arc<Meal>> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.meals.iter().find(|m| &m.id == id).cloned())
            .collect()
    }
}
