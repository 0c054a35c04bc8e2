use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{NewNotification, Notification};

pub const LIST_LIMIT: i64 = 50;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, new: NewNotification) -> anyhow::Result<Notification>;
    /// Newest first, at most [`LIST_LIMIT`].
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Notification>>;
    /// `false` when the notification doesn't exist or isn't the user's.
    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn mark_all_read(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    reference_id: Option<Uuid>,
    read: bool,
    read_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
}

impl From<NotificationRow> for Notification {
    fn from(r: NotificationRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            kind: r.kind.parse().unwrap_or(super::dto::NotificationKind::System),
            title: r.title,
            message: r.message,
            reference_id: r.reference_id,
            read: r.read,
            read_at: r.read_at,
            created_at: r.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgNotificationRepository {
    db: PgPool,
}

impl PgNotificationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, new: NewNotification) -> anyhow::Result<Notification> {
        let n = Notification::from_new(new);
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, reference_id, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            RETURNING id, user_id, kind, title, message, reference_id, read, read_at, created_at
            "#,
        )
        .bind(n.id)
        .bind(n.user_id)
        .bind(n.kind.as_str())
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.reference_id)
        .bind(n.created_at)
        .fetch_one(&self.db)
        .await
        .context("insert notification")?;
        Ok(row.into())
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, kind, title, message, reference_id, read, read_at, created_at
              FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(LIST_LIMIT)
        .fetch_all(&self.db)
        .await
        .context("list notifications")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE notifications
               SET read = TRUE, read_at = now()
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("mark notification read")?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE notifications
               SET read = TRUE, read_at = now()
             WHERE user_id = $1 AND read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("mark all notifications read")?;
        Ok(res.rows_affected())
    }
}
