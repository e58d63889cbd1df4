use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{moderation::ReportRequest, user::CurrentUser},
    services::admin,
};

/// Flags a post for admin review.
/// Moderator or admin.
#[utoipa::path(
    post,
    path = "/api/moderation/posts/{id}/report",
    params(("id" = i64, Path, description = "Post id")),
    request_body = ReportRequest,
    responses(
        (status = 201, description = "Report created"),
        (status = 403, description = "Not a moderator"),
        (status = 404, description = "Post not found")
    ),
    tag = "moderation"
)]
pub async fn report_post(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
    Json(payload): Json<ReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = admin::report_post(&pool, &user, post_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Asks the admins for the moderator role.
#[utoipa::path(
    post,
    path = "/api/role-requests",
    responses(
        (status = 201, description = "Request recorded"),
        (status = 400, description = "Already a moderator or admin"),
        (status = 409, description = "Request already sent")
    ),
    tag = "moderation"
)]
pub async fn request_role(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    admin::request_role(&pool, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Request sent" })),
    ))
}
