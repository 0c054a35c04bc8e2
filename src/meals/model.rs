use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Slot type a meal can fill in a day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => anyhow::bail!("unknown meal type: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String, // free-form label, e.g. "2 slices"
    #[serde(default)]
    pub price: f64,
}

/// Planner-facing meal. Prices and nutrition are never negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub price: f64,
    pub prep_time: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl Meal {
    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
