// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CurrentUser, LoginRequest, RegisterRequest, UserResponse},
    services::auth,
    utils::cookie::{SESSION_COOKIE, clear_session_cookie, get_cookie, session_cookie},
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Invalid username, email or password"),
        (status = 409, description = "Username or email taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth::register(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Authenticates a user and starts a session.
///
/// The session token travels in an HttpOnly `session` cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, body = UserResponse, description = "Sets the session cookie"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth::login(&pool, &payload).await?;
    let token = auth::issue_session(&pool, user.id, config.session_ttl_hours).await?;

    tracing::info!("User {} logged in", user.id);

    let cookie = session_cookie(&token, config.session_ttl_hours, config.cookie_secure);
    Ok(([(SET_COOKIE, cookie)], Json(UserResponse::from(user))))
}

/// Ends the current session, if any, and clears the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "auth"
)]
pub async fn logout(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = get_cookie(&headers, SESSION_COOKIE) {
        auth::logout(&pool, token).await?;
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie(config.cookie_secure))],
        Json(json!({ "message": "Logged out" })),
    ))
}

/// Returns the logged-in user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, body = CurrentUser),
        (status = 401, description = "Not logged in")
    ),
    tag = "auth"
)]
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}
