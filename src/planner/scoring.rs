//! Composite score used by the scored catalog search.
//!
//! `0.4 * calorie efficiency + 0.4 * calorie fit + 0.2 * budget fit`.
//! Calorie efficiency (kcal per currency unit) is not normalized across
//! candidates, so cheap calorie-dense meals dominate the ranking.

use std::{cmp::Ordering, sync::Arc};

use crate::meals::Meal;

pub const EFFICIENCY_WEIGHT: f64 = 0.4;
pub const CALORIE_FIT_WEIGHT: f64 = 0.4;
pub const BUDGET_FIT_WEIGHT: f64 = 0.2;

/// Prices below this are treated as this, so free meals don't divide by zero.
pub const PRICE_EPSILON: f64 = 0.01;

/// Calorie fit used when there is no slot left to aim at.
pub const NEUTRAL_FIT: f64 = 0.5;

/// Size of the pool the tie-break draws from.
pub const TOP_CANDIDATES: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct ScoreContext {
    pub remaining_budget: f64,
    /// `None` when no slots remain.
    pub ideal_per_slot: Option<f64>,
}

/// Calories still wanted per remaining slot (this one included). Once the
/// goal is met the ideal is zero, favouring the lightest meals.
pub fn ideal_per_slot(calorie_goal: u32, calories_so_far: u32, slots_remaining: usize) -> Option<f64> {
    if slots_remaining == 0 {
        return None;
    }
    let wanted = (f64::from(calorie_goal) - f64::from(calories_so_far)).max(0.0);
    Some(wanted / slots_remaining as f64)
}

pub fn calorie_efficiency(meal: &Meal) -> f64 {
    f64::from(meal.calories) / meal.price.max(PRICE_EPSILON)
}

pub fn calorie_fit(meal: &Meal, ideal_per_slot: Option<f64>) -> f64 {
    match ideal_per_slot {
        None => NEUTRAL_FIT,
        Some(ideal) => {
            let denom = if ideal == 0.0 { 1.0 } else { ideal };
            1.0 - (f64::from(meal.calories) - ideal).abs() / denom
        }
    }
}

pub fn budget_fit(meal: &Meal, remaining_budget: f64) -> f64 {
    if meal.price <= remaining_budget {
        1.0
    } else {
        0.0
    }
}

pub fn score_candidate(meal: &Meal, ctx: ScoreContext) -> f64 {
    EFFICIENCY_WEIGHT * calorie_efficiency(meal)
        + CALORIE_FIT_WEIGHT * calorie_fit(meal, ctx.ideal_per_slot)
        + BUDGET_FIT_WEIGHT * budget_fit(meal, ctx.remaining_budget)
}

#[derive(Debug, Clone)]
pub struct ScoredMeal {
    pub meal: Arc<Meal>,
    pub score: f64,
}

/// Scores and sorts best-first. The sort is stable, so equal scores keep
/// catalog order.
pub fn rank(candidates: Vec<Arc<Meal>>, ctx: ScoreContext) -> Vec<ScoredMeal> {
    let mut scored: Vec<ScoredMeal> = candidates
        .into_iter()
        .map(|meal| {
            let score = score_candidate(&meal, ctx);
            ScoredMeal { meal, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}
