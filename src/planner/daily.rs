//! Fills one day's slots.
//!
//! Each slot tries, in order:
//! 1. the user's selected pool (first match by type, budget and week-level
//!    unused-ness; never scored),
//! 2. a scored search over the filtered catalog, drawing at random among the
//!    top three,
//! 3. the first affordable catalog meal of any type not already eaten today.
//!
//! A slot no tier can fill stays empty; the day is simply shorter.

use std::{collections::HashSet, sync::Arc};

use crate::meals::{Meal, MealType};

use super::{
    plan::{DayPlan, Weekday},
    scoring::{ideal_per_slot, rank, ScoreContext, TOP_CANDIDATES},
    tiebreak::TieBreak,
};

/// Running totals for one day. Consumed and returned by each fill so a
/// day's state can't leak into the next.
#[derive(Debug, Clone)]
pub struct DayTally {
    remaining_budget: f64,
    total_calories: u32,
    meals: Vec<Arc<Meal>>,
}

impl DayTally {
    pub fn new(daily_budget: f64) -> Self {
        Self {
            remaining_budget: daily_budget,
            total_calories: 0,
            meals: Vec::new(),
        }
    }

    pub fn remaining_budget(&self) -> f64 {
        self.remaining_budget
    }

    pub fn total_calories(&self) -> u32 {
        self.total_calories
    }

    pub fn meals(&self) -> &[Arc<Meal>] {
        &self.meals
    }

    fn affords(&self, meal: &Meal) -> bool {
        meal.price <= self.remaining_budget
    }

    fn already_has(&self, meal: &Meal) -> bool {
        self.meals.iter().any(|m| m.id == meal.id)
    }

    #[must_use]
    pub fn with(mut self, meal: Arc<Meal>) -> Self {
        self.remaining_budget -= meal.price;
        self.total_calories = self.total_calories.saturating_add(meal.calories);
        self.meals.push(meal);
        self
    }

    pub fn into_day(self, day: Weekday) -> DayPlan {
        let total_cost = self.meals.iter().map(|m| m.price).sum();
        DayPlan {
            day,
            meals: self.meals,
            total_calories: self.total_calories,
            total_cost,
        }
    }
}

/// Which tier filled a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    Pool,
    Scored,
    Fallback,
    Unfilled,
}

/// Inputs shared by every day of one planning run.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    pub slots: &'a [MealType],
    pub catalog: &'a [Arc<Meal>],
    pub selected_pool: &'a [Arc<Meal>],
    pub daily_budget: f64,
    pub calorie_goal: u32,
}

impl DayContext<'_> {
    fn is_selected(&self, meal: &Meal) -> bool {
        self.selected_pool.iter().any(|m| m.id == meal.id)
    }
}

#[derive(Debug, Clone)]
pub struct PlannedDay {
    pub plan: DayPlan,
    pub outcomes: Vec<SlotOutcome>,
}

impl PlannedDay {
    pub fn unfilled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == SlotOutcome::Unfilled)
            .count()
    }
}

/// Plans a single day. `used_selected` is week-scoped: selected meals placed
/// here are added to it and won't be placed again by any tier.
pub fn plan_day<T: TieBreak + ?Sized>(
    day: Weekday,
    ctx: &DayContext<'_>,
    used_selected: &mut HashSet<String>,
    tie_break: &mut T,
) -> PlannedDay {
    let mut tally = DayTally::new(ctx.daily_budget);
    let mut outcomes = Vec::with_capacity(ctx.slots.len());

    for &slot in ctx.slots {
        let (next, outcome) = fill_slot(slot, ctx, tally, used_selected, tie_break);
        tally = next;
        outcomes.push(outcome);
    }

    PlannedDay {
        plan: tally.into_day(day),
        outcomes,
    }
}

fn fill_slot<T: TieBreak + ?Sized>(
    slot: MealType,
    ctx: &DayContext<'_>,
    tally: DayTally,
    used_selected: &mut HashSet<String>,
    tie_break: &mut T,
) -> (DayTally, SlotOutcome) {
    let picked = pick_from_pool(slot, ctx, &tally, used_selected)
        .map(|m| (m, SlotOutcome::Pool))
        .or_else(|| pick_scored(slot, ctx, &tally, used_selected, tie_break).map(|m| (m, SlotOutcome::Scored)))
        .or_else(|| pick_fallback(ctx, &tally, used_selected).map(|m| (m, SlotOutcome::Fallback)));

    match picked {
        Some((meal, outcome)) => {
            if ctx.is_selected(&meal) {
                used_selected.insert(meal.id.clone());
            }
            (tally.with(meal), outcome)
        }
        None => (tally, SlotOutcome::Unfilled),
    }
}

fn pick_from_pool(
    slot: MealType,
    ctx: &DayContext<'_>,
    tally: &DayTally,
    used_selected: &HashSet<String>,
) -> Option<Arc<Meal>> {
    ctx.selected_pool
        .iter()
        .find(|m| m.meal_type == slot && tally.affords(m) && !used_selected.contains(&m.id))
        .cloned()
}

fn pick_scored<T: TieBreak + ?Sized>(
    slot: MealType,
    ctx: &DayContext<'_>,
    tally: &DayTally,
    used_selected: &HashSet<String>,
    tie_break: &mut T,
) -> Option<Arc<Meal>> {
    let candidates: Vec<Arc<Meal>> = ctx
        .catalog
        .iter()
        .filter(|m| {
            m.meal_type == slot
                && tally.affords(m)
                && !tally.already_has(m)
                && !used_selected.contains(&m.id)
        })
        .cloned()
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let slots_remaining = ctx.slots.len().saturating_sub(tally.meals().len());
    let score_ctx = ScoreContext {
        remaining_budget: tally.remaining_budget(),
        ideal_per_slot: ideal_per_slot(ctx.calorie_goal, tally.total_calories(), slots_remaining),
    };
    let ranked = rank(candidates, score_ctx);
    let top = ranked.len().min(TOP_CANDIDATES);
    let idx = tie_break.pick(top).min(top - 1);
    ranked.into_iter().nth(idx).map(|s| s.meal)
}

fn pick_fallback(
    ctx: &DayContext<'_>,
    tally: &DayTally,
    used_selected: &HashSet<String>,
) -> Option<Arc<Meal>> {
    ctx.catalog
        .iter()
        .find(|m| tally.affords(m) && !tally.already_has(m) && !used_selected.contains(&m.id))
        .cloned()
}
