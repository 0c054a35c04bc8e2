use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_BUDGET: f64 = 50.0;
pub const DEFAULT_CALORIE_GOAL: u32 = 2000;
pub const DEFAULT_MEALS_PER_DAY: u32 = 3;
pub const MIN_MEALS_PER_DAY: u32 = 2;
pub const MAX_MEALS_PER_DAY: u32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    #[default]
    Weekly,
}

/// Dietary filter: `"none"` on the wire, otherwise a tag meals must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum DietaryPreference {
    #[default]
    None,
    Tag(String),
}

impl From<String> for DietaryPreference {
    fn from(s: String) -> Self {
        if s.is_empty() || s == "none" {
            DietaryPreference::None
        } else {
            DietaryPreference::Tag(s)
        }
    }
}

impl From<DietaryPreference> for String {
    fn from(p: DietaryPreference) -> Self {
        match p {
            DietaryPreference::None => "none".to_string(),
            DietaryPreference::Tag(t) => t,
        }
    }
}

/// Raw planning request as submitted by the client; every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceInput {
    pub budget: Option<f64>,
    pub budget_period: Option<BudgetPeriod>,
    pub dietary_preference: Option<String>,
    pub calorie_goal: Option<f64>,
    pub meals_per_day: Option<i64>,
    pub selected_recipe_ids: Option<Vec<String>>,
}

/// Validated planning request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanPreferences {
    pub budget: f64,
    pub budget_period: BudgetPeriod,
    pub dietary_preference: DietaryPreference,
    pub calorie_goal: u32,
    pub meals_per_day: u32,
    #[serde(default)]
    pub selected_recipe_ids: Vec<String>,
}

fn is_valid_tag(tag: &str) -> bool {
    lazy_static! {
        static ref TAG_RE: Regex = Regex::new(r"^[a-z][a-z0-9-]*$").unwrap();
    }
    TAG_RE.is_match(tag)
}

impl PlanPreferences {
    /// Fills defaults, clamps `mealsPerDay` into 2..=5 and rejects budgets or
    /// calorie goals that are present but not positive.
    pub fn validate(input: PreferenceInput) -> Result<Self, ValidationError> {
        let budget = match input.budget {
            None => DEFAULT_BUDGET,
            Some(b) if b.is_finite() && b > 0.0 => b,
            Some(_) => return Err(ValidationError::new("budget", "must be a positive number")),
        };

        let calorie_goal = match input.calorie_goal {
            None => DEFAULT_CALORIE_GOAL,
            Some(c) if c.is_finite() && c >= 1.0 => c.round().min(f64::from(u32::MAX)) as u32,
            Some(_) => {
                return Err(ValidationError::new(
                    "calorieGoal",
                    "must be a positive number of calories",
                ))
            }
        };

        let meals_per_day = input
            .meals_per_day
            .map(|n| n.clamp(i64::from(MIN_MEALS_PER_DAY), i64::from(MAX_MEALS_PER_DAY)) as u32)
            .unwrap_or(DEFAULT_MEALS_PER_DAY);

        let dietary_preference = match input.dietary_preference {
            None => DietaryPreference::None,
            Some(raw) => {
                let tag = raw.trim().to_lowercase();
                if tag.is_empty() || tag == "none" {
                    DietaryPreference::None
                } else if is_valid_tag(&tag) {
                    DietaryPreference::Tag(tag)
                } else {
                    return Err(ValidationError::new(
                        "dietaryPreference",
                        format!("{raw:?} is not a dietary tag"),
                    ));
                }
            }
        };

        let mut selected_recipe_ids: Vec<String> = Vec::new();
        for id in input.selected_recipe_ids.unwrap_or_default() {
            let id = id.trim().to_string();
            if !id.is_empty() && !selected_recipe_ids.contains(&id) {
                selected_recipe_ids.push(id);
            }
        }

        Ok(Self {
            budget,
            budget_period: input.budget_period.unwrap_or_default(),
            dietary_preference,
            calorie_goal,
            meals_per_day,
            selected_recipe_ids,
        })
    }

    pub fn daily_budget(&self) -> f64 {
        match self.budget_period {
            BudgetPeriod::Daily => self.budget,
            BudgetPeriod::Weekly => self.budget / 7.0,
        }
    }

    pub fn weekly_budget(&self) -> f64 {
        match self.budget_period {
            BudgetPeriod::Daily => self.budget * 7.0,
            BudgetPeriod::Weekly => self.budget,
        }
    }
}

impl Default for PlanPreferences {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            budget_period: BudgetPeriod::Weekly,
            dietary_preference: DietaryPreference::None,
            calorie_goal: DEFAULT_CALORIE_GOAL,
            meals_per_day: DEFAULT_MEALS_PER_DAY,
            selected_recipe_ids: Vec::new(),
        }
    }
}
