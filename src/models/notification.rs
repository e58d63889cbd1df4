use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::reaction::Vote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Like,
    Dislike,
    Comment,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Dislike => "dislike",
            NotificationKind::Comment => "comment",
        }
    }
}

impl From<Vote> for NotificationKind {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Like => NotificationKind::Like,
            Vote::Dislike => NotificationKind::Dislike,
        }
    }
}

/// Activity on one of the recipient's posts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub actor_id: i64,
    pub actor: String,
    pub post_id: i64,
    pub post_title: String,
    /// 'like', 'dislike' or 'comment'.
    pub kind: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationList {
    pub unread: i64,
    pub notifications: Vec<Notification>,
}
