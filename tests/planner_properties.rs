use std::collections::HashSet;

use gohanflow::{
    meals::{Meal, MealCatalog, MealType},
    planner::{
        assemble, filter_by_diet, generate, plan_day, slot_template, BudgetPeriod, DayContext,
        DietaryPreference, FirstTieBreak, PlanPreferences, PreferenceInput, RandomTieBreak,
        SlotOutcome, Weekday,
    },
};
use rand::{rngs::StdRng, SeedableRng};

fn meal(id: &str, meal_type: MealType, price: f64, calories: u32, tags: &[&str]) -> Meal {
    Meal {
        id: id.into(),
        name: id.into(),
        meal_type,
        calories,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: 0.0,
        price,
        prep_time: 10,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ingredients: vec![],
    }
}

/// Two cheap meals of every type.
fn roomy_catalog() -> MealCatalog {
    MealCatalog::merge(
        vec![],
        vec![
            meal("b1", MealType::Breakfast, 2.0, 350, &["vegan"]),
            meal("b2", MealType::Breakfast, 3.0, 420, &[]),
            meal("l1", MealType::Lunch, 4.0, 550, &["vegan"]),
            meal("l2", MealType::Lunch, 5.0, 600, &[]),
            meal("d1", MealType::Dinner, 5.0, 650, &[]),
            meal("d2", MealType::Dinner, 6.0, 700, &["vegan"]),
            meal("s1", MealType::Snack, 1.0, 150, &["vegan"]),
            meal("s2", MealType::Snack, 1.5, 200, &[]),
        ],
    )
}

fn daily(budget: f64, meals_per_day: u32) -> PlanPreferences {
    PlanPreferences {
        budget,
        budget_period: BudgetPeriod::Daily,
        meals_per_day,
        ..Default::default()
    }
}

#[test]
fn every_day_fills_its_slot_template() {
    let catalog = roomy_catalog();
    for meals_per_day in 2..=5 {
        let prefs = daily(100.0, meals_per_day);
        let mut tie_break = RandomTieBreak(StdRng::seed_from_u64(u64::from(meals_per_day)));
        let plan = generate(&prefs, &catalog, &mut tie_break);
        let template = slot_template(meals_per_day);
        for day in &plan.weekly_plan {
            let types: Vec<MealType> = day.meals.iter().map(|m| m.meal_type).collect();
            assert_eq!(types, template, "mealsPerDay={meals_per_day} on {:?}", day.day);
        }
    }
}

#[test]
fn out_of_range_meal_counts_are_clamped() {
    for (raw, expected) in [(0, 2), (1, 2), (9, 5)] {
        let prefs = PlanPreferences::validate(PreferenceInput {
            meals_per_day: Some(raw),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(prefs.meals_per_day, expected);
        assert_eq!(slot_template(prefs.meals_per_day).len(), expected as usize);
    }
}

#[test]
fn pool_and_scored_tiers_stay_within_remaining_budget() {
    let catalog = roomy_catalog();
    let pool = catalog.select(&["l2".to_string(), "d1".to_string()]);
    for seed in 0..20 {
        let ctx = DayContext {
            slots: slot_template(5),
            catalog: catalog.meals(),
            selected_pool: &pool,
            daily_budget: 9.0,
            calorie_goal: 2000,
        };
        let mut used = HashSet::new();
        let planned = plan_day(
            Weekday::Monday,
            &ctx,
            &mut used,
            &mut RandomTieBreak(StdRng::seed_from_u64(seed)),
        );

        let mut remaining = ctx.daily_budget;
        let filled = planned
            .outcomes
            .iter()
            .filter(|o| **o != SlotOutcome::Unfilled);
        for (meal, outcome) in planned.plan.meals.iter().zip(filled) {
            if matches!(outcome, SlotOutcome::Pool | SlotOutcome::Scored) {
                assert!(meal.price <= remaining + 1e-9, "{} over budget via {outcome:?}", meal.id);
            }
            remaining -= meal.price;
        }
    }
}

#[test]
fn selected_meals_appear_at_most_once_per_week() {
    let catalog = roomy_catalog();
    let ids: Vec<String> = ["b2", "l2", "d1", "s2"].iter().map(|s| s.to_string()).collect();
    let prefs = PlanPreferences {
        selected_recipe_ids: ids.clone(),
        ..daily(100.0, 5)
    };
    for seed in 0..10 {
        let plan = generate(&prefs, &catalog, &mut RandomTieBreak(StdRng::seed_from_u64(seed)));
        for id in &ids {
            let count = plan.meal_ids().filter(|m| *m == id.as_str()).count();
            assert_eq!(count, 1, "{id} scheduled {count} times");
        }
        // the pool wins on the first day
        let monday: Vec<&str> = plan.weekly_plan[0].meals.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(monday, ["b2", "s2", "l2", "s1", "d1"]);
    }
}

#[test]
fn diet_filter_is_idempotent() {
    let catalog = roomy_catalog();
    for pref in [
        DietaryPreference::None,
        DietaryPreference::Tag("vegan".into()),
        DietaryPreference::Tag("keto".into()),
    ] {
        let once = filter_by_diet(catalog.meals(), &pref);
        let twice = filter_by_diet(&once, &pref);
        assert_eq!(once, twice);
    }
}

#[test]
fn empty_catalog_yields_empty_week() {
    let prefs = daily(50.0, 4);
    let plan = assemble(&prefs, &[], &[], &mut FirstTieBreak);
    assert_eq!(plan.weekly_plan.len(), 7);
    for day in &plan.weekly_plan {
        assert!(day.meals.is_empty());
        assert_eq!(day.total_calories, 0);
        assert_eq!(day.total_cost, 0.0);
    }
    assert_eq!(plan.total_weekly_cost, 0.0);
    assert_eq!(plan.total_weekly_calories, 0);
}

/// Four meals, $70 a week. Dinner never fits the $3 left after breakfast and
/// lunch, so the fallback tier fills the last slot with the snack.
#[test]
fn four_meal_weekly_scenario() {
    let catalog = MealCatalog::merge(
        vec![],
        vec![
            meal("breakfast", MealType::Breakfast, 3.0, 300, &[]),
            meal("lunch", MealType::Lunch, 4.0, 500, &[]),
            meal("dinner", MealType::Dinner, 6.0, 600, &[]),
            meal("snack", MealType::Snack, 2.0, 150, &[]),
        ],
    );
    let prefs = PlanPreferences::validate(
        serde_json::from_str(
            r#"{"budget":70,"budgetPeriod":"weekly","dietaryPreference":"none",
                "calorieGoal":1400,"mealsPerDay":3,"selectedRecipeIds":[]}"#,
        )
        .unwrap(),
    )
    .unwrap();
    assert!((prefs.daily_budget() - 10.0).abs() < 1e-9);

    let plan = generate(&prefs, &catalog, &mut RandomTieBreak(StdRng::seed_from_u64(42)));
    let days: Vec<Weekday> = plan.weekly_plan.iter().map(|d| d.day).collect();
    assert_eq!(days, Weekday::WEEK);
    for day in &plan.weekly_plan {
        let ids: Vec<&str> = day.meals.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["breakfast", "lunch", "snack"]);
        assert!((day.total_cost - 9.0).abs() < 1e-9);
        assert_eq!(day.total_calories, 950);
    }
    assert!((plan.total_weekly_cost - 63.0).abs() < 1e-9);
    assert_eq!(plan.total_weekly_calories, 6650);
    assert!(plan.within_budget());
}

#[test]
fn unaffordable_slots_stay_empty() {
    // the $12 dinner never fits a $10 day, so each day is one meal short
    let catalog = MealCatalog::merge(
        vec![],
        vec![
            meal("b", MealType::Breakfast, 9.0, 500, &[]),
            meal("d", MealType::Dinner, 12.0, 800, &[]),
        ],
    );
    let prefs = PlanPreferences {
        budget: 10.0,
        budget_period: BudgetPeriod::Daily,
        meals_per_day: 2,
        ..Default::default()
    };
    let plan = generate(&prefs, &catalog, &mut FirstTieBreak);
    for day in &plan.weekly_plan {
        let ids: Vec<&str> = day.meals.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
    }
    assert!(plan.within_budget());

    // nothing affordable at all leaves every day empty
    let tight = PlanPreferences {
        budget: 8.0,
        ..prefs
    };
    let plan = generate(&tight, &catalog, &mut FirstTieBreak);
    assert!(plan.weekly_plan.iter().all(|d| d.meals.is_empty()));
}
