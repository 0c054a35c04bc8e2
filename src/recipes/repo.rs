use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{
    dto::{Comment, Recipe, RecipeStatus},
    repo_types::{RecipeBody, RecipeRow},
};

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Published recipes, newest first.
    async fn list_published(&self) -> anyhow::Result<Vec<Recipe>>;
    async fn list_published_by(&self, author_id: Uuid) -> anyhow::Result<Vec<Recipe>>;
    /// Stores a new submission as `pending` with no likes or comments.
    async fn create(&self, author_id: Uuid, author_name: &str, body: RecipeBody) -> anyhow::Result<Recipe>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>>;
    async fn set_status(&self, id: Uuid, status: RecipeStatus) -> anyhow::Result<Option<Recipe>>;
    /// Likes if `user_id` hasn't yet, unlikes otherwise.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Recipe>>;
    /// `false` when the recipe doesn't exist.
    async fn add_comment(&self, id: Uuid, comment: &Comment) -> anyhow::Result<bool>;
}

const RECIPE_COLUMNS: &str =
    "id, author_id, author_name, status, likes, liked_by, comments, body, created_at, updated_at";

#[derive(Clone)]
pub struct PgRecipeRepository {
    db: PgPool,
}

impl PgRecipeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn list_published(&self) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE status = 'published' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list published recipes")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_published_by(&self, author_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes \
              WHERE status = 'published' AND author_id = $1 \
              ORDER BY created_at DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.db)
        .await
        .context("list recipes by author")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, author_id: Uuid, author_name: &str, body: RecipeBody) -> anyhow::Result<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "INSERT INTO recipes (id, author_id, author_name, status, likes, liked_by, comments, body) \
             VALUES ($1, $2, $3, $4, 0, '{{}}', '[]'::jsonb, $5) \
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(author_name)
        .bind(RecipeStatus::Pending.as_str())
        .bind(Json(body))
        .fetch_one(&self.db)
        .await
        .context("insert recipe")?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select recipe")?;
        Ok(row.map(Into::into))
    }

    async fn set_status(&self, id: Uuid, status: RecipeStatus) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "UPDATE recipes SET status = $2, updated_at = now() WHERE id = $1 RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update recipe status")?;
        Ok(row.map(Into::into))
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Recipe>> {
        // SET expressions all see the pre-update row
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "UPDATE recipes SET \
                 likes = CASE WHEN $2 = ANY(liked_by) THEN GREATEST(likes - 1, 0) ELSE likes + 1 END, \
                 liked_by = CASE WHEN $2 = ANY(liked_by) THEN array_remove(liked_by, $2) \
                                 ELSE array_append(liked_by, $2) END, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("toggle recipe like")?;
        Ok(row.map(Into::into))
    }

    async fn add_comment(&self, id: Uuid, comment: &Comment) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE recipes
               SET comments = comments || $2, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(vec![comment]))
        .execute(&self.db)
        .await
        .context("append recipe comment")?;
        Ok(res.rows_affected() > 0)
    }
}
