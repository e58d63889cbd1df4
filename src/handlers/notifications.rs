use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{notification::NotificationList, user::CurrentUser},
    services::notifications,
};

/// Recent activity on the caller's posts, newest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses((status = 200, body = NotificationList)),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NotificationList>, AppError> {
    Ok(Json(notifications::list(&pool, user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read",
    responses((status = 200, description = "Number of notifications marked read")),
    tag = "notifications"
)]
pub async fn mark_notifications_read(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    let updated = notifications::mark_read(&pool, user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}
