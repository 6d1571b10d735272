use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum NotificationKind {
    CommentPost = 0,
    LikePost = 1,
    Follow = 2,
}

/// A notification delivered to one user, persisted and also pushed over the
/// event bus for live subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,

    /// The user this notification is for.
    pub dest_user: Uuid,

    /// The user whose action triggered it, if any.
    pub actor: Option<Uuid>,

    pub kind: NotificationKind,

    pub content: String,

    pub image: Option<String>,

    pub read: bool,

    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Notification sent to `dest_user` when `actor` starts following them.
    pub fn follow(actor: &crate::models::User, dest_user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            dest_user,
            actor: Some(actor.id),
            kind: NotificationKind::Follow,
            content: format!("{} has followed you", actor.user_name),
            image: actor.avatar_url.clone(),
            read: false,
            created_at: Utc::now(),
        }
    }
}
