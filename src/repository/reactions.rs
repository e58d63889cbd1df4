use chrono::Utc;
use sqlx::{FromRow, SqliteExecutor};

use crate::models::reaction::{ReactionTarget, Vote};

#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct VoteCounts {
    pub likes: i64,
    pub dislikes: i64,
}

/// The user's current vote on the target, if any.
pub async fn find<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    target: ReactionTarget,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT vote FROM reactions WHERE user_id = ? AND {} = ?",
        target.column()
    ))
    .bind(user_id)
    .bind(target.id())
    .fetch_optional(db)
    .await
}

pub async fn insert<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    target: ReactionTarget,
    vote: Vote,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO reactions (user_id, {}, vote, created_at) VALUES (?, ?, ?, ?)",
        target.column()
    ))
    .bind(user_id)
    .bind(target.id())
    .bind(vote.value())
    .bind(Utc::now())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    target: ReactionTarget,
    vote: Vote,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "UPDATE reactions SET vote = ? WHERE user_id = ? AND {} = ?",
        target.column()
    ))
    .bind(vote.value())
    .bind(user_id)
    .bind(target.id())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    target: ReactionTarget,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "DELETE FROM reactions WHERE user_id = ? AND {} = ?",
        target.column()
    ))
    .bind(user_id)
    .bind(target.id())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn counts<'e>(
    db: impl SqliteExecutor<'e>,
    target: ReactionTarget,
) -> Result<VoteCounts, sqlx::Error> {
    sqlx::query_as::<_, VoteCounts>(&format!(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN vote = 1 THEN 1 ELSE 0 END), 0) AS likes,
            COALESCE(SUM(CASE WHEN vote = -1 THEN 1 ELSE 0 END), 0) AS dislikes
        FROM reactions
        WHERE {} = ?
        "#,
        target.column()
    ))
    .bind(target.id())
    .fetch_one(db)
    .await
}
