use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND: {}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub planner_seed: Option<u64>,
    pub moderator_ids: Vec<Uuid>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage_backend = match std::env::var("STORAGE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StorageBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when STORAGE_BACKEND=postgres");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "gohanflow".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "gohanflow-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };

        let planner_seed = match std::env::var("PLANNER_SEED") {
            Ok(v) => Some(v.parse::<u64>().context("PLANNER_SEED must be an unsigned integer")?),
            Err(_) => None,
        };

        let moderator_ids = parse_moderator_ids(&std::env::var("MODERATOR_IDS").unwrap_or_default())?;

        Ok(Self {
            storage_backend,
            database_url,
            jwt,
            planner_seed,
            moderator_ids,
        })
    }

    pub fn is_moderator(&self, user_id: Uuid) -> bool {
        self.moderator_ids.contains(&user_id)
    }
}

/// Comma separated list of user ids; blanks are ignored.
fn parse_moderator_ids(raw: &str) -> anyhow::Result<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(s).with_context(|| format!("bad moderator id {s:?}")))
        .collect()
}
