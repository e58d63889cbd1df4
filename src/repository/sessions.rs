use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor};

/// A session row joined with its owner.
#[derive(Debug, Clone, FromRow)]
pub struct SessionUser {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

pub async fn create<'e>(
    db: impl SqliteExecutor<'e>,
    token: &str,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_by_token<'e>(db: impl SqliteExecutor<'e>, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_by_user<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn find_with_user<'e>(
    db: impl SqliteExecutor<'e>,
    token: &str,
) -> Result<Option<SessionUser>, sqlx::Error> {
    sqlx::query_as::<_, SessionUser>(
        r#"
        SELECT s.token, s.expires_at, u.id AS user_id, u.username, u.email, u.role
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await
}
