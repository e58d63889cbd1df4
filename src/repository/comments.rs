use chrono::Utc;
use sqlx::{FromRow, SqliteExecutor};

use crate::models::comment::Comment;

/// `?1` is the viewer id (0 for anonymous).
const COMMENT_SELECT: &str = r#"
    SELECT
        c.id, c.post_id, c.user_id, u.username AS author, c.content, c.created_at, c.updated_at,
        (SELECT COUNT(*) FROM reactions r WHERE r.comment_id = c.id AND r.vote = 1) AS likes,
        (SELECT COUNT(*) FROM reactions r WHERE r.comment_id = c.id AND r.vote = -1) AS dislikes,
        (SELECT r.vote FROM reactions r WHERE r.comment_id = c.id AND r.user_id = ?1) AS my_vote
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

pub async fn create<'e>(
    db: impl SqliteExecutor<'e>,
    post_id: i64,
    user_id: i64,
    content: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO comments (post_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Thread of a post, oldest first.
pub async fn list_for_post<'e>(
    db: impl SqliteExecutor<'e>,
    post_id: i64,
    viewer_id: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.post_id = ?2 ORDER BY c.id ASC"))
        .bind(viewer_id)
        .bind(post_id)
        .fetch_all(db)
        .await
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    comment_id: i64,
    viewer_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = ?2"))
        .bind(viewer_id)
        .bind(comment_id)
        .fetch_optional(db)
        .await
}

/// Who wrote a comment and under which post.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CommentOwner {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
}

pub async fn owner<'e>(
    db: impl SqliteExecutor<'e>,
    comment_id: i64,
) -> Result<Option<CommentOwner>, sqlx::Error> {
    sqlx::query_as::<_, CommentOwner>("SELECT id, post_id, user_id FROM comments WHERE id = ?")
        .bind(comment_id)
        .fetch_optional(db)
        .await
}

pub async fn update<'e>(
    db: impl SqliteExecutor<'e>,
    comment_id: i64,
    content: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(Utc::now())
        .bind(comment_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, comment_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(comment_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
