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
    models::{
        comment::{Comment, CommentRequest},
        user::CurrentUser,
    },
    services::posts,
};

/// Add a comment to a post. The post author gets a notification.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    params(("id" = i64, Path, description = "Post id")),
    request_body = CommentRequest,
    responses(
        (status = 201, body = Comment),
        (status = 400, description = "Invalid comment"),
        (status = 404, description = "Post not found")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = posts::create_comment(&pool, &user, post_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = CommentRequest,
    responses(
        (status = 200, body = Comment),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn update_comment(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = posts::update_comment(&pool, &user, id, &payload).await?;
    Ok(Json(comment))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    posts::delete_comment(&pool, &user, id).await?;
    Ok(Json(json!({ "message": "Comment deleted" })))
}
