use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::planner::{DayPlan, PlanPreferences, WeeklyPlan};

use super::dto::StoredPlan;

/// Storage for generated plans. Implementations keep at most one plan per
/// user flagged current.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn current_plan(&self, user_id: Uuid) -> anyhow::Result<Option<StoredPlan>>;
    /// Stores `plan` as the user's current plan, unflagging the previous one.
    async fn save_new_plan(&self, user_id: Uuid, plan: &WeeklyPlan) -> anyhow::Result<Uuid>;
    /// Newest first.
    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<StoredPlan>>;
    /// `false` when the plan doesn't exist or isn't the user's.
    async fn mark_current(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn delete_plan(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    user_id: Uuid,
    weekly_plan: Json<Vec<DayPlan>>,
    total_weekly_cost: f64,
    total_weekly_calories: i64,
    preferences: Json<PlanPreferences>,
    is_current: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PlanRow> for StoredPlan {
    fn from(r: PlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            plan: WeeklyPlan {
                weekly_plan: r.weekly_plan.0,
                total_weekly_cost: r.total_weekly_cost,
                total_weekly_calories: r.total_weekly_calories.clamp(0, i64::from(u32::MAX)) as u32,
                preferences: r.preferences.0,
            },
            is_current: r.is_current,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PLAN_COLUMNS: &str = "id, user_id, weekly_plan, total_weekly_cost, total_weekly_calories, \
                            preferences, is_current, created_at, updated_at";

#[derive(Clone)]
pub struct PgPlanRepository {
    db: PgPool,
}

impl PgPlanRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn current_plan(&self, user_id: Uuid) -> anyhow::Result<Option<StoredPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans \
              WHERE user_id = $1 AND is_current \
              ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("select current plan")?;

        let mut rows = rows.into_iter();
        let Some(newest) = rows.next() else {
            return Ok(None);
        };

        let stale: Vec<Uuid> = rows.map(|r| r.id).collect();
        if !stale.is_empty() {
            warn!(%user_id, keep = %newest.id, stale = stale.len(), "multiple current plans; reconciling");
            sqlx::query(
                r#"
                UPDATE meal_plans
                   SET is_current = FALSE, updated_at = now()
                 WHERE user_id = $1 AND id = ANY($2)
                "#,
            )
            .bind(user_id)
            .bind(stale)
            .execute(&self.db)
            .await
            .context("reconcile current plans")?;
        }

        Ok(Some(newest.into()))
    }

    async fn save_new_plan(&self, user_id: Uuid, plan: &WeeklyPlan) -> anyhow::Result<Uuid> {
        let mut tx = self.db.begin().await.context("begin save plan")?;

        sqlx::query(
            r#"
            UPDATE meal_plans
               SET is_current = FALSE, updated_at = now()
             WHERE user_id = $1 AND is_current
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("unflag current plan")?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO meal_plans
                (id, user_id, weekly_plan, total_weekly_cost, total_weekly_calories, preferences, is_current)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(&plan.weekly_plan))
        .bind(plan.total_weekly_cost)
        .bind(i64::from(plan.total_weekly_calories))
        .bind(Json(&plan.preferences))
        .fetch_one(&mut *tx)
        .await
        .context("insert plan")?;

        tx.commit().await.context("commit save plan")?;
        Ok(id)
    }

    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<StoredPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list plans")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_current(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await.context("begin mark current")?;

        let exists = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM meal_plans WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock plan")?
        .is_some();
        if !exists {
            tx.rollback().await.context("rollback mark current")?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE meal_plans
               SET is_current = FALSE, updated_at = now()
             WHERE user_id = $1 AND is_current AND id <> $2
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("unflag other plans")?;

        sqlx::query("UPDATE meal_plans SET is_current = TRUE, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("flag plan current")?;

        tx.commit().await.context("commit mark current")?;
        Ok(true)
    }

    async fn delete_plan(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM meal_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete plan")?;
        Ok(res.rows_affected() > 0)
    }
}
