use tracing::{debug, warn};

use super::{dto::NewNotification, repo::NotificationRepository};

/// Delivers a notification, logging instead of failing. Callers never see
/// an error from here.
pub async fn notify(repo: &dyn NotificationRepository, new: NewNotification) {
    let user_id = new.user_id;
    let kind = new.kind;
    match repo.create(new).await {
        Ok(n) => debug!(%user_id, %kind, notification_id = %n.id, "notification sent"),
        Err(e) => warn!(error = %e, %user_id, %kind, "notification failed; ignoring"),
    }
}
