// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        category::{Category, CreateCategoryRequest},
        moderation::{Report, RoleRequest},
        user::{CurrentUser, Role, UserResponse},
    },
    services::admin,
};

/// Lists every non-admin account.
/// Admin only.
#[utoipa::path(get, path = "/api/admin/users", responses((status = 200, body = [UserResponse])), tag = "admin")]
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(admin::list_users(&pool).await?))
}

/// Grants the moderator role.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/promote",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Target is an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn promote_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(admin::change_role(&pool, id, Role::Moderator).await?))
}

/// Drops a moderator back to user.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/demote",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Target is an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn demote_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(admin::change_role(&pool, id, Role::User).await?))
}

/// Pending reports, oldest first.
#[utoipa::path(get, path = "/api/admin/reports", responses((status = 200, body = [Report])), tag = "admin")]
pub async fn list_reports(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(admin::list_reports(&pool).await?))
}

/// Accepts a report: the reported post is deleted.
#[utoipa::path(
    post,
    path = "/api/admin/reports/{id}/accept",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already resolved")
    ),
    tag = "admin"
)]
pub async fn accept_report(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    admin::accept_report(&pool, &config, id).await?;
    Ok(Json(json!({ "message": "Report accepted, post deleted" })))
}

#[utoipa::path(
    post,
    path = "/api/admin/reports/{id}/reject",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report rejected"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already resolved")
    ),
    tag = "admin"
)]
pub async fn reject_report(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    admin::reject_report(&pool, &user, id).await?;
    Ok(Json(json!({ "message": "Report rejected" })))
}

/// Users waiting for the moderator role.
#[utoipa::path(get, path = "/api/admin/requests", responses((status = 200, body = [RoleRequest])), tag = "admin")]
pub async fn list_requests(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(admin::list_requests(&pool).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/requests/{user_id}/approve",
    params(("user_id" = i64, Path, description = "Requesting user")),
    responses(
        (status = 200, description = "User is now a moderator"),
        (status = 404, description = "Request not found")
    ),
    tag = "admin"
)]
pub async fn approve_request(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    admin::approve_request(&pool, user_id).await?;
    Ok(Json(json!({ "message": "Request approved" })))
}

#[utoipa::path(
    post,
    path = "/api/admin/requests/{user_id}/reject",
    params(("user_id" = i64, Path, description = "Requesting user")),
    responses(
        (status = 200, description = "Request dropped"),
        (status = 404, description = "Request not found")
    ),
    tag = "admin"
)]
pub async fn reject_request(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    admin::reject_request(&pool, user_id).await?;
    Ok(Json(json!({ "message": "Request rejected" })))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, body = Category),
        (status = 409, description = "Category exists")
    ),
    tag = "admin"
)]
pub async fn create_category(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = admin::create_category(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
