// src/handlers/filter.rs
//
// Personal post listings under /api/me.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        post::{PageParams, Post},
        user::CurrentUser,
    },
    services::filter::{self, PostFilter},
};

async fn listing(
    pool: &SqlitePool,
    user: &CurrentUser,
    which: PostFilter,
    params: PageParams,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = filter::for_user(pool, user.id, which, params.cursor, params.limit).await?;
    Ok(Json(posts))
}

/// Posts written by the caller.
#[utoipa::path(get, path = "/api/me/posts", params(PageParams), responses((status = 200, body = [Post])), tag = "me")]
pub async fn my_posts(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, AppError> {
    listing(&pool, &user, PostFilter::Mine, params).await
}

/// Posts the caller liked.
#[utoipa::path(get, path = "/api/me/liked", params(PageParams), responses((status = 200, body = [Post])), tag = "me")]
pub async fn liked_posts(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, AppError> {
    listing(&pool, &user, PostFilter::Liked, params).await
}

#[utoipa::path(get, path = "/api/me/disliked", params(PageParams), responses((status = 200, body = [Post])), tag = "me")]
pub async fn disliked_posts(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, AppError> {
    listing(&pool, &user, PostFilter::Disliked, params).await
}

/// Posts the caller commented on.
#[utoipa::path(get, path = "/api/me/commented", params(PageParams), responses((status = 200, body = [Post])), tag = "me")]
pub async fn commented_posts(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, AppError> {
    listing(&pool, &user, PostFilter::Commented, params).await
}
