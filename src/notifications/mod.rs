pub mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod services;

pub use dto::{NewNotification, Notification, NotificationKind};
pub use handlers::router;
pub use memory::InMemoryNotificationRepository;
pub use repo::{NotificationRepository, PgNotificationRepository};
pub use services::notify;
