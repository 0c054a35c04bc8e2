use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::planner::WeeklyPlan;

use super::{dto::StoredPlan, repo::PlanRepository};

/// Plans kept in insertion order. A single write lock covers unflag + insert,
/// so the one-current-plan rule holds without reconciliation.
#[derive(Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<Vec<StoredPlan>>,
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn current_plan(&self, user_id: Uuid) -> anyhow::Result<Option<StoredPlan>> {
        let plans = self.plans.read().await;
        Ok(plans
            .iter()
            .rev()
            .find(|p| p.user_id == user_id && p.is_current)
            .cloned())
    }

    async fn save_new_plan(&self, user_id: Uuid, plan: &WeeklyPlan) -> anyhow::Result<Uuid> {
        let now = OffsetDateTime::now_utc();
        let mut plans = self.plans.write().await;
        for p in plans.iter_mut().filter(|p| p.user_id == user_id && p.is_current) {
            p.is_current = false;
            p.updated_at = now;
        }
        let id = Uuid::new_v4();
        plans.push(StoredPlan {
            id,
            user_id,
            plan: plan.clone(),
            is_current: true,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<StoredPlan>> {
        let plans = self.plans.read().await;
        Ok(plans
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_current(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut plans = self.plans.write().await;
        if !plans.iter().any(|p| p.id == id && p.user_id == user_id) {
            return Ok(false);
        }
        let now = OffsetDateTime::now_utc();
        for p in plans.iter_mut().filter(|p| p.user_id == user_id) {
            let current = p.id == id;
            if p.is_current != current {
                p.is_current = current;
                p.updated_at = now;
            }
        }
        Ok(true)
    }

    async fn delete_plan(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut plans = self.plans.write().await;
        let before = plans.len();
        plans.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(plans.len() < before)
    }
}
