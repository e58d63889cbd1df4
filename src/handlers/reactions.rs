use axum::{
    Extension, Json,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        reaction::{ReactionRequest, ReactionResponse, ReactionTarget},
        user::CurrentUser,
    },
    services::reactions,
};

/// Like (1) or dislike (-1) a post. Sending the same vote again removes it.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/reactions",
    params(("id" = i64, Path, description = "Post id")),
    request_body = ReactionRequest,
    responses(
        (status = 200, body = ReactionResponse),
        (status = 404, description = "Post not found")
    ),
    tag = "reactions"
)]
pub async fn react_to_post(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ReactionRequest>,
) -> Result<Json<ReactionResponse>, AppError> {
    let result = reactions::toggle(&pool, user.id, ReactionTarget::Post(id), payload.vote).await?;
    Ok(Json(result))
}

/// Like (1) or dislike (-1) a comment. Sending the same vote again removes it.
#[utoipa::path(
    post,
    path = "/api/comments/{id}/reactions",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = ReactionRequest,
    responses(
        (status = 200, body = ReactionResponse),
        (status = 404, description = "Comment not found")
    ),
    tag = "reactions"
)]
pub async fn react_to_comment(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ReactionRequest>,
) -> Result<Json<ReactionResponse>, AppError> {
    let result =
        reactions::toggle(&pool, user.id, ReactionTarget::Comment(id), payload.vote).await?;
    Ok(Json(result))
}
