use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::meals::Meal;

use super::preferences::PlanPreferences;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const WEEK: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];
}

/// One day of a plan. `meals` may be shorter than the slot template when
/// the catalog ran out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day: Weekday,
    pub meals: Vec<Arc<Meal>>,
    pub total_calories: u32,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    pub weekly_plan: Vec<DayPlan>,
    pub total_weekly_cost: f64,
    pub total_weekly_calories: u32,
    pub preferences: PlanPreferences,
}

impl WeeklyPlan {
    /// Informational only: the planner never rejects an over-budget week.
    pub fn within_budget(&self) -> bool {
        self.total_weekly_cost <= self.preferences.weekly_budget()
    }

    pub fn meal_ids(&self) -> impl Iterator<Item = &str> {
        self.weekly_plan
            .iter()
            .flat_map(|d| d.meals.iter())
            .map(|m| m.id.as_str())
    }
}
