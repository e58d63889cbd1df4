use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::notification::{NotificationKind, NotificationList},
    repository::notifications,
};

const LIST_LIMIT: i64 = 50;

/// Tells the author of `post_id` about activity by `actor_id`.
///
/// Acting on your own post is silent. Failures are logged, never surfaced:
/// the comment or vote that triggered the notification has already succeeded.
pub async fn notify(
    pool: &SqlitePool,
    recipient_id: i64,
    actor_id: i64,
    post_id: i64,
    kind: NotificationKind,
) {
    if recipient_id == actor_id {
        return;
    }
    if let Err(e) = notifications::create(pool, recipient_id, actor_id, post_id, kind).await {
        tracing::warn!(
            "Failed to store {} notification for user {}: {:?}",
            kind.as_str(),
            recipient_id,
            e
        );
    }
}

pub async fn list(pool: &SqlitePool, user_id: i64) -> Result<NotificationList, AppError> {
    let notifications = notifications::list_for_user(pool, user_id, LIST_LIMIT).await?;
    let unread = notifications::unread_count(pool, user_id).await?;
    Ok(NotificationList {
        unread,
        notifications,
    })
}

pub async fn mark_read(pool: &SqlitePool, user_id: i64) -> Result<u64, AppError> {
    Ok(notifications::mark_all_read(pool, user_id).await?)
}
