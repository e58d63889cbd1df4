use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::notification::{Notification, NotificationKind};

pub async fn create<'e>(
    db: impl SqliteExecutor<'e>,
    recipient_id: i64,
    actor_id: i64,
    post_id: i64,
    kind: NotificationKind,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, actor_id, post_id, kind, is_read, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(recipient_id)
    .bind(actor_id)
    .bind(post_id)
    .bind(kind.as_str())
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Newest first.
pub async fn list_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT n.id, n.actor_id, u.username AS actor, n.post_id, p.title AS post_title,
               n.kind, n.is_read, n.created_at
        FROM notifications n
        JOIN users u ON u.id = n.actor_id
        JOIN posts p ON p.id = n.post_id
        WHERE n.user_id = ?
        ORDER BY n.id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn mark_all_read<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn unread_count<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0")
        .bind(user_id)
        .fetch_one(db)
        .await
}
