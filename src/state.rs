use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, JwtConfig, StorageBackend},
    meals::{static_meals, Meal},
    notifications::{InMemoryNotificationRepository, NotificationRepository, PgNotificationRepository},
    plans::{InMemoryPlanRepository, PgPlanRepository, PlanRepository},
    recipes::{InMemoryRecipeRepository, PgRecipeRepository, RecipeRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub plans: Arc<dyn PlanRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub fallback_meals: Arc<Vec<Meal>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let fallback_meals = Arc::new(static_meals()?);

        match config.storage_backend {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for postgres storage")?;
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to postgres")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres storage");

                Ok(Self {
                    plans: Arc::new(PgPlanRepository::new(db.clone())),
                    recipes: Arc::new(PgRecipeRepository::new(db.clone())),
                    notifications: Arc::new(PgNotificationRepository::new(db)),
                    config,
                    fallback_meals,
                })
            }
            StorageBackend::Memory => {
                warn!("using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config, fallback_meals))
            }
        }
    }

    fn in_memory(config: Arc<AppConfig>, fallback_meals: Arc<Vec<Meal>>) -> Self {
        Self {
            config,
            plans: Arc::new(InMemoryPlanRepository::default()),
            recipes: Arc::new(InMemoryRecipeRepository::default()),
            notifications: Arc::new(InMemoryNotificationRepository::default()),
            fallback_meals,
        }
    }

    /// In-memory state with a fixed planner seed and no moderators.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            storage_backend: StorageBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            planner_seed: Some(7),
            moderator_ids: Vec::new(),
        });
        let fallback_meals = Arc::new(static_meals().expect("bundled meals parse"));
        Self::in_memory(config, fallback_meals)
    }
}
