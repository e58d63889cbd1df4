use chrono::Utc;
use sqlx::{FromRow, SqliteExecutor};

use crate::models::moderation::{Report, RoleRequest};

// --- Reports ---

pub async fn create_report<'e>(
    db: impl SqliteExecutor<'e>,
    post_id: i64,
    reporter_id: i64,
    reason: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO reports (post_id, reporter_id, reason, status, created_at) VALUES (?, ?, ?, 'pending', ?)",
    )
    .bind(post_id)
    .bind(reporter_id)
    .bind(reason)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn list_pending_reports<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<Report>, sqlx::Error> {
    sqlx::query_as::<_, Report>(
        r#"
        SELECT r.id, r.post_id, p.title AS post_title, r.reporter_id,
               u.username AS reporter_name, u.email AS reporter_email,
               r.reason, r.status, r.created_at
        FROM reports r
        JOIN posts p ON p.id = r.post_id
        JOIN users u ON u.id = r.reporter_id
        WHERE r.status = 'pending'
        ORDER BY r.id ASC
        "#,
    )
    .fetch_all(db)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub struct ReportRef {
    pub id: i64,
    pub post_id: i64,
    pub status: String,
}

pub async fn find_report<'e>(
    db: impl SqliteExecutor<'e>,
    report_id: i64,
) -> Result<Option<ReportRef>, sqlx::Error> {
    sqlx::query_as::<_, ReportRef>("SELECT id, post_id, status FROM reports WHERE id = ?")
        .bind(report_id)
        .fetch_optional(db)
        .await
}

/// Marks a pending report as rejected. Returns false when it was not pending.
pub async fn reject_report<'e>(
    db: impl SqliteExecutor<'e>,
    report_id: i64,
    resolved_by: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE reports SET status = 'rejected', resolved_at = ?, resolved_by = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(Utc::now())
    .bind(resolved_by)
    .bind(report_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

// --- Role requests ---

pub async fn create_role_request<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO role_requests (user_id, created_at) VALUES (?, ?)")
        .bind(user_id)
        .bind(Utc::now())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn role_request_exists<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM role_requests WHERE user_id = ?)")
        .bind(user_id)
        .fetch_one(db)
        .await
}

pub async fn list_role_requests<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<RoleRequest>, sqlx::Error> {
    sqlx::query_as::<_, RoleRequest>(
        r#"
        SELECT rr.user_id, u.username, u.email, rr.created_at
        FROM role_requests rr
        JOIN users u ON u.id = rr.user_id
        ORDER BY rr.id ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn delete_role_request<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM role_requests WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
