// src/handlers/posts.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    middleware::session::MaybeUser,
    models::{
        category::Category,
        post::{Post, PostDetail, PostForm, PostInput, PostListParams},
        user::CurrentUser,
    },
    repository::categories,
    services::{filter, posts},
};

/// Collects the `title`, `content`, `categories` and `image` parts of a post form.
///
/// `categories` may repeat; each value may also be comma-separated.
/// An empty `image` part means no image.
async fn read_post_form(mut multipart: Multipart) -> Result<PostInput, AppError> {
    let mut input = PostInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => input.title = field.text().await?,
            "content" => input.content = field.text().await?,
            "categories" => {
                let raw = field.text().await?;
                input.categories.extend(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string),
                );
            }
            "image" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    input.image = Some(bytes.to_vec());
                }
            }
            other => tracing::debug!("Ignoring unexpected form field {:?}", other),
        }
    }

    Ok(input)
}

/// List posts (newest first).
/// Supports cursor-based pagination and filtering by category names.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PostListParams),
    responses((status = 200, body = [Post])),
    tag = "posts"
)]
pub async fn list_posts(
    State(pool): State<SqlitePool>,
    viewer: MaybeUser,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let names = params.category_names();
    let posts = filter::by_categories(
        &pool,
        viewer.viewer_id(),
        &names,
        params.cursor,
        params.limit,
    )
    .await?;
    Ok(Json(posts))
}

/// Get a single post with its comments.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, body = PostDetail),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(pool): State<SqlitePool>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = posts::get(&pool, id, viewer.viewer_id()).await?;
    Ok(Json(detail))
}

/// Create a new post from a multipart form.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = Post),
        (status = 400, description = "Invalid fields, unknown category or bad image"),
        (status = 401, description = "Not logged in")
    ),
    tag = "posts"
)]
pub async fn create_post(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = read_post_form(multipart).await?;
    let post = posts::create(&pool, &config, &user, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Edit a post. Author only.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = Post),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn update_post(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = read_post_form(multipart).await?;
    let post = posts::update(&pool, &config, &user, id, input).await?;
    Ok(Json(post))
}

/// Delete a post. Author, moderator or admin.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn delete_post(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    posts::delete(&pool, &config, &user, id).await?;
    Ok(Json(json!({ "message": "Post deleted" })))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, body = [Category])),
    tag = "posts"
)]
pub async fn list_categories(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let categories = categories::list(&pool).await?;
    Ok(Json(categories))
}
