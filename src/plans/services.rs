use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::PlanError,
    meals::MealCatalog,
    notifications::{notify, NewNotification, NotificationKind},
    planner::{self, PlanPreferences, PreferenceInput, RandomTieBreak, WeeklyPlan},
    recipes::recipe_to_meal,
    state::AppState,
};

use super::dto::StoredPlan;

/// Result of a generation request. The plan is always present; `Unsaved`
/// carries the storage error so the caller can still show the week.
#[derive(Debug)]
pub enum GenerateOutcome {
    Saved { id: Uuid, plan: WeeklyPlan },
    Unsaved { plan: WeeklyPlan, error: PlanError },
}

impl GenerateOutcome {
    pub fn plan(&self) -> &WeeklyPlan {
        match self {
            GenerateOutcome::Saved { plan, .. } | GenerateOutcome::Unsaved { plan, .. } => plan,
        }
    }
}

/// Published recipes first, bundled meals after.
pub async fn load_catalog(state: &AppState) -> Result<MealCatalog, PlanError> {
    let recipes = state
        .recipes
        .list_published()
        .await
        .map_err(|e| PlanError::Persistence(e.context("load recipe catalog")))?;
    let recipe_meals = recipes.iter().map(recipe_to_meal).collect();
    Ok(MealCatalog::merge(recipe_meals, state.fallback_meals.as_ref().clone()))
}

fn tie_break(state: &AppState) -> RandomTieBreak<StdRng> {
    let rng = match state.config.planner_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    RandomTieBreak(rng)
}

pub async fn generate(state: &AppState, user_id: Uuid, input: PreferenceInput) -> Result<GenerateOutcome, PlanError> {
    let preferences = PlanPreferences::validate(input)?;
    generate_with(state, user_id, preferences).await
}

/// Plans a week from `preferences`, stores it as current and tells the user.
/// Fails only when the catalog can't be loaded; a failed save still hands
/// back the plan.
pub async fn generate_with(
    state: &AppState,
    user_id: Uuid,
    preferences: PlanPreferences,
) -> Result<GenerateOutcome, PlanError> {
    let catalog = load_catalog(state).await?;
    let plan = planner::generate(&preferences, &catalog, &mut tie_break(state));

    let id = match state.plans.save_new_plan(user_id, &plan).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %format!("{e:#}"), %user_id, "saving plan failed; returning it unsaved");
            return Ok(GenerateOutcome::Unsaved {
                plan,
                error: PlanError::Persistence(e),
            });
        }
    };
    info!(
        plan_id = %id,
        %user_id,
        total_cost = plan.total_weekly_cost,
        within_budget = plan.within_budget(),
        "plan generated"
    );

    notify(
        state.notifications.as_ref(),
        NewNotification {
            user_id,
            kind: NotificationKind::Meal,
            title: "Meal Plan Generated".into(),
            message: format!(
                "Your personalized weekly meal plan is ready! Total cost: ${:.2}",
                plan.total_weekly_cost
            ),
            reference_id: Some(id),
        },
    )
    .await;

    Ok(GenerateOutcome::Saved { id, plan })
}

/// Re-runs generation with the preferences stored on the current plan.
pub async fn regenerate(state: &AppState, user_id: Uuid) -> Result<GenerateOutcome, PlanError> {
    let current = current_plan(state, user_id)
        .await?
        .ok_or(PlanError::NoCurrentPlan)?;
    generate_with(state, user_id, current.plan.preferences).await
}

pub async fn current_plan(state: &AppState, user_id: Uuid) -> Result<Option<StoredPlan>, PlanError> {
    state
        .plans
        .current_plan(user_id)
        .await
        .map_err(PlanError::Persistence)
}

pub async fn list_plans(state: &AppState, user_id: Uuid) -> Result<Vec<StoredPlan>, PlanError> {
    state
        .plans
        .list_plans(user_id)
        .await
        .map_err(PlanError::Persistence)
}

pub async fn mark_current(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), PlanError> {
    let found = state
        .plans
        .mark_current(user_id, id)
        .await
        .map_err(PlanError::Persistence)?;
    if found {
        Ok(())
    } else {
        Err(PlanError::NotFound)
    }
}

pub async fn delete_plan(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), PlanError> {
    let found = state
        .plans
        .delete_plan(user_id, id)
        .await
        .map_err(PlanError::Persistence)?;
    if found {
        Ok(())
    } else {
        Err(PlanError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        plans::repo::PlanRepository,
        recipes::{
            dto::{Comment, Recipe, RecipeStatus},
            repo::RecipeRepository,
            repo_types::RecipeBody,
        },
    };

    struct DownPlanRepo;

    #[async_trait]
    impl PlanRepository for DownPlanRepo {
        async fn current_plan(&self, _user_id: Uuid) -> anyhow::Result<Option<StoredPlan>> {
            anyhow::bail!("db down")
        }
        async fn save_new_plan(&self, _user_id: Uuid, _plan: &WeeklyPlan) -> anyhow::Result<Uuid> {
            anyhow::bail!("db down")
        }
        async fn list_plans(&self, _user_id: Uuid) -> anyhow::Result<Vec<StoredPlan>> {
            anyhow::bail!("db down")
        }
        async fn mark_current(&self, _user_id: Uuid, _id: Uuid) -> anyhow::Result<bool> {
            anyhow::bail!("db down")
        }
        async fn delete_plan(&self, _user_id: Uuid, _id: Uuid) -> anyhow::Result<bool> {
            anyhow::bail!("db down")
        }
    }

    struct DownRecipeRepo;

    #[async_trait]
    impl RecipeRepository for DownRecipeRepo {
        async fn list_published(&self) -> anyhow::Result<Vec<Recipe>> {
            anyhow::bail!("recipes down")
        }
        async fn list_published_by(&self, _author_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
            anyhow::bail!("recipes down")
        }
        async fn create(&self, _author_id: Uuid, _author_name: &str, _body: RecipeBody) -> anyhow::Result<Recipe> {
            anyhow::bail!("recipes down")
        }
        async fn get(&self, _id: Uuid) -> anyhow::Result<Option<Recipe>> {
            anyhow::bail!("recipes down")
        }
        async fn set_status(&self, _id: Uuid, _status: RecipeStatus) -> anyhow::Result<Option<Recipe>> {
            anyhow::bail!("recipes down")
        }
        async fn toggle_like(&self, _id: Uuid, _user_id: Uuid) -> anyhow::Result<Option<Recipe>> {
            anyhow::bail!("recipes down")
        }
        async fn add_comment(&self, _id: Uuid, _comment: &Comment) -> anyhow::Result<bool> {
            anyhow::bail!("recipes down")
        }
    }

    #[tokio::test]
    async fn generate_saves_and_notifies() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let outcome = generate(&state, user, PreferenceInput::default()).await.unwrap();

        let GenerateOutcome::Saved { id, plan } = outcome else {
            panic!("plan should be saved");
        };
        assert_eq!(plan.weekly_plan.len(), 7);

        let current = current_plan(&state, user).await.unwrap().unwrap();
        assert_eq!(current.id, id);
        assert!(current.is_current);

        let inbox = state.notifications.list_for_user(user).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "Meal Plan Generated");
        assert_eq!(
            inbox[0].message,
            format!(
                "Your personalized weekly meal plan is ready! Total cost: ${:.2}",
                plan.total_weekly_cost
            )
        );
    }

    #[tokio::test]
    async fn invalid_preferences_are_rejected() {
        let state = AppState::fake();
        let input = PreferenceInput {
            budget: Some(-5.0),
            ..Default::default()
        };
        let err = generate(&state, Uuid::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[tokio::test]
    async fn storage_failure_still_returns_plan_without_notifying() {
        let mut state = AppState::fake();
        state.plans = Arc::new(DownPlanRepo);
        let user = Uuid::new_v4();

        let outcome = generate(&state, user, PreferenceInput::default()).await.unwrap();
        let GenerateOutcome::Unsaved { plan, error } = outcome else {
            panic!("plan should be unsaved");
        };
        assert_eq!(plan.weekly_plan.len(), 7);
        assert!(matches!(error, PlanError::Persistence(_)));
        assert!(state.notifications.list_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recipe_store_failure_fails_generation() {
        let mut state = AppState::fake();
        state.recipes = Arc::new(DownRecipeRepo);
        let user = Uuid::new_v4();

        let err = generate(&state, user, PreferenceInput::default()).await.unwrap_err();
        let PlanError::Persistence(inner) = &err else {
            panic!("expected a storage failure, got {err:?}");
        };
        assert!(format!("{inner:#}").contains("load recipe catalog"));
        assert!(list_plans(&state, user).await.unwrap().is_empty());
        assert!(state.notifications.list_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn regenerate_reuses_stored_preferences() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        assert!(matches!(
            regenerate(&state, user).await.unwrap_err(),
            PlanError::NoCurrentPlan
        ));

        let input = PreferenceInput {
            budget: Some(20.0),
            budget_period: Some(crate::planner::BudgetPeriod::Daily),
            meals_per_day: Some(4),
            ..Default::default()
        };
        generate(&state, user, input).await.unwrap();
        let outcome = regenerate(&state, user).await.unwrap();
        assert_eq!(outcome.plan().preferences.meals_per_day, 4);
        assert_eq!(outcome.plan().preferences.budget, 20.0);
        assert_eq!(list_plans(&state, user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn selected_published_recipe_is_scheduled_once() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let recipe = state
            .recipes
            .create(
                author,
                "cook",
                RecipeBody {
                    name: Some("Miso ramen".into()),
                    recipe_type: Some("lunch".into()),
                    calories: Some(550.0),
                    price: Some(4.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        state
            .recipes
            .set_status(recipe.id, RecipeStatus::Published)
            .await
            .unwrap();

        let input = PreferenceInput {
            budget: Some(100.0),
            selected_recipe_ids: Some(vec![recipe.id.to_string()]),
            ..Default::default()
        };
        let outcome = generate(&state, author, input).await.unwrap();
        let id = recipe.id.to_string();
        let count = outcome.plan().meal_ids().filter(|m| *m == id).count();
        assert_eq!(count, 1);
        assert!(outcome.plan().weekly_plan[0].meals.iter().any(|m| m.id == id));
    }

    #[tokio::test]
    async fn mark_and_delete_report_missing_plans() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        assert!(matches!(
            mark_current(&state, user, Uuid::new_v4()).await.unwrap_err(),
            PlanError::NotFound
        ));
        assert!(matches!(
            delete_plan(&state, user, Uuid::new_v4()).await.unwrap_err(),
            PlanError::NotFound
        ));
    }
}
