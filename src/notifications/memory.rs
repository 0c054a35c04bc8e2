use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    dto::{NewNotification, Notification},
    repo::{NotificationRepository, LIST_LIMIT},
};

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    items: RwLock<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, new: NewNotification) -> anyhow::Result<Notification> {
        let n = Notification::from_new(new);
        self.items.write().await.push(n.clone());
        Ok(n)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Notification>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(LIST_LIMIT as usize)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|n| n.id == id && n.user_id == user_id) {
            Some(n) => {
                n.read = true;
                n.read_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let mut count = 0;
        for n in self.items.write().await.iter_mut() {
            if n.user_id == user_id && !n.read {
                n.read = true;
                n.read_at = Some(now);
                count += 1;
            }
        }
        Ok(count)
    }
}
