use std::{collections::HashSet, sync::Arc};

use tracing::{debug, warn};

use crate::meals::{Meal, MealCatalog};

use super::{
    daily::{plan_day, DayContext},
    filter::filter_by_diet,
    plan::{DayPlan, Weekday, WeeklyPlan},
    preferences::PlanPreferences,
    slots::slot_template,
    tiebreak::TieBreak,
};

/// Full pipeline for one request: diet filter, selected pool lookup, assembly.
///
/// The selected pool is looked up in the unfiltered catalog; a meal the user
/// explicitly picked is honoured even if it lacks the dietary tag.
pub fn generate<T: TieBreak + ?Sized>(
    preferences: &PlanPreferences,
    catalog: &MealCatalog,
    tie_break: &mut T,
) -> WeeklyPlan {
    let filtered = filter_by_diet(catalog.meals(), &preferences.dietary_preference);
    let pool = catalog.select(&preferences.selected_recipe_ids);
    debug!(
        catalog = catalog.len(),
        filtered = filtered.len(),
        selected = pool.len(),
        "planning week"
    );
    assemble(preferences, &filtered, &pool, tie_break)
}

/// Plans Monday..Sunday over an already filtered catalog.
pub fn assemble<T: TieBreak + ?Sized>(
    preferences: &PlanPreferences,
    filtered: &[Arc<Meal>],
    selected_pool: &[Arc<Meal>],
    tie_break: &mut T,
) -> WeeklyPlan {
    let ctx = DayContext {
        slots: slot_template(preferences.meals_per_day),
        catalog: filtered,
        selected_pool,
        daily_budget: preferences.daily_budget(),
        calorie_goal: preferences.calorie_goal,
    };
    let mut used_selected = HashSet::new();

    let days: Vec<DayPlan> = Weekday::WEEK
        .iter()
        .map(|&day| {
            let planned = plan_day(day, &ctx, &mut used_selected, tie_break);
            let unfilled = planned.unfilled();
            if unfilled > 0 {
                warn!(?day, unfilled, slots = ctx.slots.len(), "day under-filled");
            } else {
                debug!(?day, meals = planned.plan.meals.len(), "day planned");
            }
            planned.plan
        })
        .collect();

    let total_weekly_cost = days.iter().map(|d| d.total_cost).sum();
    let total_weekly_calories = days
        .iter()
        .fold(0u32, |acc, d| acc.saturating_add(d.total_calories));

    WeeklyPlan {
        weekly_plan: days,
        total_weekly_cost,
        total_weekly_calories,
        preferences: preferences.clone(),
    }
}
