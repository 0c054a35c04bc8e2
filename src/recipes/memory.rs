use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    dto::{Comment, Recipe, RecipeStatus},
    repo::RecipeRepository,
    repo_types::{RecipeBody, RecipeRow},
};

/// Keeps raw rows so reads go through the same normalization as Postgres.
#[derive(Default)]
pub struct InMemoryRecipeRepository {
    rows: RwLock<Vec<RecipeRow>>,
}

impl InMemoryRecipeRepository {
    /// Inserts a stored row as is, e.g. an imported document.
    pub async fn insert_row(&self, row: RecipeRow) {
        self.rows.write().await.push(row);
    }

    async fn published_where<F>(&self, keep: F) -> Vec<Recipe>
    where
        F: Fn(&RecipeRow) -> bool + Send,
    {
        let rows = self.rows.read().await;
        let mut rows: Vec<&RecipeRow> = rows
            .iter()
            .filter(|r| r.status == RecipeStatus::Published.as_str() && keep(r))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().cloned().map(Into::into).collect()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn list_published(&self) -> anyhow::Result<Vec<Recipe>> {
        Ok(self.published_where(|_| true).await)
    }

    async fn list_published_by(&self, author_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        Ok(self.published_where(|r| r.author_id == author_id).await)
    }

    async fn create(&self, author_id: Uuid, author_name: &str, body: RecipeBody) -> anyhow::Result<Recipe> {
        let now = OffsetDateTime::now_utc();
        let row = RecipeRow {
            id: Uuid::new_v4(),
            author_id,
            author_name: author_name.to_string(),
            status: RecipeStatus::Pending.as_str().to_string(),
            likes: 0,
            liked_by: vec![],
            comments: Json(vec![]),
            body: Json(body),
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(row.clone());
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.id == id).cloned().map(Into::into))
    }

    async fn set_status(&self, id: Uuid, status: RecipeStatus) -> anyhow::Result<Option<Recipe>> {
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status.as_str().to_string();
            r.updated_at = OffsetDateTime::now_utc();
            r.clone().into()
        }))
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
            if let Some(pos) = r.liked_by.iter().position(|u| *u == user_id) {
                r.liked_by.remove(pos);
                r.likes = (r.likes - 1).max(0);
            } else {
                r.liked_by.push(user_id);
                r.likes += 1;
            }
            r.updated_at = OffsetDateTime::now_utc();
            r.clone().into()
        }))
    }

    async fn add_comment(&self, id: Uuid, comment: &Comment) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.comments.0.push(comment.clone());
                r.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str) -> RecipeBody {
        RecipeBody {
            name: Some(name.into()),
            recipe_type: Some("lunch".into()),
            price: Some(3.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn new_recipes_are_pending_and_hidden() {
        let repo = InMemoryRecipeRepository::default();
        let created = repo.create(Uuid::new_v4(), "cook", body("Pasta")).await.unwrap();
        assert_eq!(created.status, RecipeStatus::Pending);
        assert_eq!(created.likes, 0);
        assert!(repo.list_published().await.unwrap().is_empty());

        repo.set_status(created.id, RecipeStatus::Published).await.unwrap();
        assert_eq!(repo.list_published().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_by_author_filters() {
        let repo = InMemoryRecipeRepository::default();
        let alice = Uuid::new_v4();
        let mine = repo.create(alice, "alice", body("Mine")).await.unwrap();
        let theirs = repo.create(Uuid::new_v4(), "bob", body("Theirs")).await.unwrap();
        for id in [mine.id, theirs.id] {
            repo.set_status(id, RecipeStatus::Published).await.unwrap();
        }
        let listed = repo.list_published_by(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
    }

    #[tokio::test]
    async fn like_toggles() {
        let repo = InMemoryRecipeRepository::default();
        let recipe = repo.create(Uuid::new_v4(), "cook", body("Soup")).await.unwrap();
        let fan = Uuid::new_v4();

        let liked = repo.toggle_like(recipe.id, fan).await.unwrap().unwrap();
        assert_eq!(liked.likes, 1);
        assert_eq!(liked.liked_by, [fan]);

        let unliked = repo.toggle_like(recipe.id, fan).await.unwrap().unwrap();
        assert_eq!(unliked.likes, 0);
        assert!(unliked.liked_by.is_empty());

        assert!(repo.toggle_like(Uuid::new_v4(), fan).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn comments_append_in_order() {
        let repo = InMemoryRecipeRepository::default();
        let recipe = repo.create(Uuid::new_v4(), "cook", body("Salad")).await.unwrap();
        for text in ["first", "second"] {
            let c = Comment {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                author_name: None,
                text: text.into(),
                created_at: OffsetDateTime::now_utc(),
            };
            assert!(repo.add_comment(recipe.id, &c).await.unwrap());
        }
        let stored = repo.get(recipe.id).await.unwrap().unwrap();
        let texts: Vec<_> = stored.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }
}
