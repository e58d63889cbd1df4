// src/services/admin.rs
//
// Moderation rules: user roles, post reports, moderator role requests and categories.

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::{
        category::{Category, CreateCategoryRequest},
        moderation::{DEFAULT_REPORT_REASON, Report, ReportRequest, RoleRequest},
        user::{CurrentUser, Role, UserResponse},
    },
    repository::{admin, categories, posts, users},
    services::posts::delete_with_image,
};

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserResponse>, AppError> {
    let users = users::list_non_admins(pool).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Sets a non-admin account to `role`. Admin accounts cannot be changed.
pub async fn change_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<UserResponse, AppError> {
    let user = users::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.role() == Role::Admin {
        return Err(AppError::Forbidden("Admins cannot be changed".to_string()));
    }

    users::set_role(pool, user_id, role).await?;
    tracing::info!("User {} is now {}", user.username, role);

    let user = users::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(user.into())
}

// --- Reports ---

pub async fn report_post(
    pool: &SqlitePool,
    reporter: &CurrentUser,
    post_id: i64,
    payload: &ReportRequest,
) -> Result<i64, AppError> {
    payload.validate()?;

    posts::owner(pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let reason = payload
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_REPORT_REASON.to_string());

    let id = admin::create_report(pool, post_id, reporter.id, &reason).await?;
    tracing::info!("Post {} reported by {}", post_id, reporter.username);
    Ok(id)
}

pub async fn list_reports(pool: &SqlitePool) -> Result<Vec<Report>, AppError> {
    Ok(admin::list_pending_reports(pool).await?)
}

/// Accepting a report deletes the reported post; its reports go with it.
pub async fn accept_report(pool: &SqlitePool, config: &Config, report_id: i64) -> Result<(), AppError> {
    let report = admin::find_report(pool, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;
    if report.status != "pending" {
        return Err(AppError::Conflict("Report was already resolved".to_string()));
    }

    let post = posts::owner(pool, report.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    delete_with_image(pool, config, post.id, post.image_url.as_deref()).await?;

    tracing::info!("Report {} accepted, post {} deleted", report_id, post.id);
    Ok(())
}

pub async fn reject_report(pool: &SqlitePool, admin_user: &CurrentUser, report_id: i64) -> Result<(), AppError> {
    let report = admin::find_report(pool, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    if !admin::reject_report(pool, report.id, admin_user.id).await? {
        return Err(AppError::Conflict("Report was already resolved".to_string()));
    }
    Ok(())
}

// --- Role requests ---

/// A plain user asks to become a moderator. One request per user.
pub async fn request_role(pool: &SqlitePool, user: &CurrentUser) -> Result<(), AppError> {
    if user.role != Role::User {
        return Err(AppError::BadRequest(format!(
            "You already have the {} role",
            user.role
        )));
    }
    if admin::role_request_exists(pool, user.id).await? {
        return Err(AppError::Conflict("Request already sent".to_string()));
    }

    admin::create_role_request(pool, user.id).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Request already sent".to_string())
        } else {
            AppError::from(e)
        }
    })?;
    Ok(())
}

pub async fn list_requests(pool: &SqlitePool) -> Result<Vec<RoleRequest>, AppError> {
    Ok(admin::list_role_requests(pool).await?)
}

/// Grants the moderator role and clears the request.
pub async fn approve_request(pool: &SqlitePool, user_id: i64) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    if !admin::delete_role_request(&mut *tx, user_id).await? {
        return Err(AppError::NotFound("Request not found".to_string()));
    }
    users::set_role(&mut *tx, user_id, Role::Moderator).await?;
    tx.commit().await?;

    tracing::info!("Role request of user {} approved", user_id);
    Ok(())
}

pub async fn reject_request(pool: &SqlitePool, user_id: i64) -> Result<(), AppError> {
    if !admin::delete_role_request(pool, user_id).await? {
        return Err(AppError::NotFound("Request not found".to_string()));
    }
    Ok(())
}

// --- Categories ---

pub async fn create_category(
    pool: &SqlitePool,
    payload: &CreateCategoryRequest,
) -> Result<Category, AppError> {
    payload.validate()?;

    categories::create(pool, payload.name.trim())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Category '{}' already exists", payload.name.trim()))
            } else {
                AppError::from(e)
            }
        })
}
