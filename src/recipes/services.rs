use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{RecipeError, ValidationError},
    notifications::{notify, NewNotification, NotificationKind},
    state::AppState,
};

use super::dto::{Comment, CreateRecipeRequest, LikeResponse, NewCommentRequest, Recipe, RecipeStatus};

const DEFAULT_AUTHOR_NAME: &str = "Anonymous";

pub async fn submit(state: &AppState, author_id: Uuid, req: CreateRecipeRequest) -> Result<Recipe, RecipeError> {
    let author_name = req
        .author_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_AUTHOR_NAME)
        .to_string();
    let body = req.validate()?;
    let recipe = state
        .recipes
        .create(author_id, &author_name, body)
        .await
        .map_err(RecipeError::Persistence)?;
    info!(recipe_id = %recipe.id, %author_id, "recipe submitted for moderation");
    Ok(recipe)
}

/// Moderation. Authors hear about approvals and rejections only.
pub async fn set_status(
    state: &AppState,
    moderator_id: Uuid,
    id: Uuid,
    status: &str,
) -> Result<Recipe, RecipeError> {
    if !state.config.is_moderator(moderator_id) {
        return Err(RecipeError::Forbidden);
    }
    let status: RecipeStatus = status
        .parse()
        .map_err(|_| ValidationError::new("status", "must be published, pending, draft or rejected"))?;

    let recipe = state
        .recipes
        .set_status(id, status)
        .await
        .map_err(RecipeError::Persistence)?
        .ok_or(RecipeError::NotFound)?;
    info!(recipe_id = %id, %status, %moderator_id, "recipe status changed");

    let message = match status {
        RecipeStatus::Published => Some(("Recipe Approved", "Your recipe has been approved and published!")),
        RecipeStatus::Rejected => Some((
            "Recipe Rejected",
            "Your recipe was not approved. Please review and resubmit.",
        )),
        RecipeStatus::Pending | RecipeStatus::Draft => None,
    };
    if let Some((title, message)) = message {
        notify(
            state.notifications.as_ref(),
            NewNotification {
                user_id: recipe.author_id,
                kind: NotificationKind::Recipe,
                title: title.into(),
                message: message.into(),
                reference_id: Some(recipe.id),
            },
        )
        .await;
    }
    Ok(recipe)
}

pub async fn toggle_like(state: &AppState, user_id: Uuid, id: Uuid) -> Result<LikeResponse, RecipeError> {
    let recipe = state
        .recipes
        .toggle_like(id, user_id)
        .await
        .map_err(RecipeError::Persistence)?
        .ok_or(RecipeError::NotFound)?;
    let liked = recipe.liked_by.contains(&user_id);
    debug!(recipe_id = %id, %user_id, liked, likes = recipe.likes, "like toggled");

    if liked && recipe.author_id != user_id {
        notify(
            state.notifications.as_ref(),
            NewNotification {
                user_id: recipe.author_id,
                kind: NotificationKind::Recipe,
                title: "New Like on Your Recipe".into(),
                message: format!("Someone liked your recipe \"{}\"", recipe.name),
                reference_id: Some(recipe.id),
            },
        )
        .await;
    }

    Ok(LikeResponse {
        likes: recipe.likes,
        liked,
    })
}

pub async fn add_comment(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: NewCommentRequest,
) -> Result<Comment, RecipeError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(ValidationError::new("text", "comment must not be empty").into());
    }
    let comment = Comment {
        id: Uuid::new_v4(),
        user_id,
        author_name: req.author_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        text: text.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    let found = state
        .recipes
        .add_comment(id, &comment)
        .await
        .map_err(RecipeError::Persistence)?;
    if !found {
        return Err(RecipeError::NotFound);
    }
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::meals::Ingredient;

    fn request() -> CreateRecipeRequest {
        CreateRecipeRequest {
            name: "Overnight oats".into(),
            description: "Oats soaked in milk overnight".into(),
            recipe_type: "breakfast".into(),
            prep_time: Some(5),
            cook_time: Some(0),
            price: Some(1.8),
            calories: Some(350.0),
            ingredients: vec![Ingredient {
                name: "oats".into(),
                quantity: "1 cup".into(),
                price: 0.5,
            }],
            instructions: vec!["Mix and chill".into()],
            author_name: Some("Kenji".into()),
            ..Default::default()
        }
    }

    fn state_with_moderator(moderator: Uuid) -> AppState {
        let mut state = AppState::fake();
        Arc::make_mut(&mut state.config).moderator_ids.push(moderator);
        state
    }

    #[tokio::test]
    async fn approval_publishes_and_notifies_author() {
        let moderator = Uuid::new_v4();
        let author = Uuid::new_v4();
        let state = state_with_moderator(moderator);

        let recipe = submit(&state, author, request()).await.unwrap();
        assert_eq!(recipe.author_name, "Kenji");
        set_status(&state, moderator, recipe.id, "published").await.unwrap();

        assert_eq!(state.recipes.list_published().await.unwrap().len(), 1);
        let inbox = state.notifications.list_for_user(author).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "Recipe Approved");
        assert_eq!(inbox[0].reference_id, Some(recipe.id));
    }

    #[tokio::test]
    async fn draft_status_is_silent() {
        let moderator = Uuid::new_v4();
        let author = Uuid::new_v4();
        let state = state_with_moderator(moderator);
        let recipe = submit(&state, author, request()).await.unwrap();
        set_status(&state, moderator, recipe.id, "draft").await.unwrap();
        assert!(state.notifications.list_for_user(author).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_moderator_is_forbidden() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let recipe = submit(&state, author, request()).await.unwrap();
        let err = set_status(&state, author, recipe.id, "published").await.unwrap_err();
        assert!(matches!(err, RecipeError::Forbidden));
    }

    #[tokio::test]
    async fn bad_status_and_missing_recipe() {
        let moderator = Uuid::new_v4();
        let state = state_with_moderator(moderator);
        let err = set_status(&state, moderator, Uuid::new_v4(), "archived").await.unwrap_err();
        assert!(matches!(err, RecipeError::Validation(_)));
        let err = set_status(&state, moderator, Uuid::new_v4(), "published").await.unwrap_err();
        assert!(matches!(err, RecipeError::NotFound));
    }

    #[tokio::test]
    async fn liking_own_recipe_does_not_notify() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let recipe = submit(&state, author, request()).await.unwrap();

        let res = toggle_like(&state, author, recipe.id).await.unwrap();
        assert!(res.liked);
        assert!(state.notifications.list_for_user(author).await.unwrap().is_empty());

        let fan = Uuid::new_v4();
        toggle_like(&state, fan, recipe.id).await.unwrap();
        let inbox = state.notifications.list_for_user(author).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "Someone liked your recipe \"Overnight oats\"");

        // unliking is silent
        let res = toggle_like(&state, fan, recipe.id).await.unwrap();
        assert!(!res.liked);
        assert_eq!(res.likes, 1);
        assert_eq!(state.notifications.list_for_user(author).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn comments_get_distinct_ids() {
        let state = AppState::fake();
        let recipe = submit(&state, Uuid::new_v4(), request()).await.unwrap();
        let user = Uuid::new_v4();
        let a = add_comment(&state, user, recipe.id, NewCommentRequest { text: "Tasty".into(), author_name: None })
            .await
            .unwrap();
        let b = add_comment(&state, user, recipe.id, NewCommentRequest { text: "Again".into(), author_name: None })
            .await
            .unwrap();
        assert_ne!(a.id, b.id);

        let err = add_comment(&state, user, recipe.id, NewCommentRequest { text: "  ".into(), author_name: None })
            .await
            .unwrap_err();
        assert!(matches!(err, RecipeError::Validation(_)));
    }
}
