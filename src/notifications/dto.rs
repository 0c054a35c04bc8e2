use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Shopping,
    Meal,
    Health,
    Recipe,
    System,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Shopping => "shopping",
            NotificationKind::Meal => "meal",
            NotificationKind::Health => "health",
            NotificationKind::Recipe => "recipe",
            NotificationKind::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = std::convert::Infallible;

    /// Unknown kinds read back as `system`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "shopping" => NotificationKind::Shopping,
            "meal" => NotificationKind::Meal,
            "health" => NotificationKind::Health,
            "recipe" => NotificationKind::Recipe,
            _ => NotificationKind::System,
        })
    }
}

/// Event to deliver to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference_id: Option<Uuid>, // plan or recipe the event is about
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference_id: Option<Uuid>,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Notification {
    pub fn from_new(new: NewNotification) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            reference_id: new.reference_id,
            read: false,
            read_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub count: u64,
}
