// src/middleware/session.rs

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::user::{CurrentUser, Role},
    services::auth::user_by_token,
    utils::cookie::{SESSION_COOKIE, get_cookie},
};

/// Axum Middleware: Authentication.
///
/// Resolves the `session` cookie to a user and injects `CurrentUser` into the
/// request extensions. Missing, unknown or expired sessions get 401.
pub async fn auth_middleware(
    State(pool): State<SqlitePool>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = get_cookie(req.headers(), SESSION_COOKIE)
        .ok_or_else(|| AppError::AuthError("Not logged in".to_string()))?
        .to_string();

    let user = user_by_token(&pool, &token)
        .await?
        .ok_or_else(|| AppError::AuthError("Session expired, please log in again".to_string()))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn require_role(req: &Request<Body>, allowed: fn(Role) -> bool) -> Result<(), AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::AuthError("Not logged in".to_string()))?;

    if allowed(user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Insufficient role".to_string()))
    }
}

/// Axum Middleware: Moderator Authorization.
///
/// Must be used AFTER `auth_middleware`. Lets moderators and admins through.
pub async fn moderator_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::can_moderate)?;
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(&req, |role| role == Role::Admin)?;
    Ok(next.run(req).await)
}

/// The caller if a valid session cookie is present, for public routes.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    /// Viewer id for queries; 0 matches no account.
    pub fn viewer_id(&self) -> i64 {
        self.0.as_ref().map(|u| u.id).unwrap_or(0)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(MaybeUser(Some(user.clone())));
        }

        let Some(token) = get_cookie(&parts.headers, SESSION_COOKIE) else {
            return Ok(MaybeUser(None));
        };

        let pool = SqlitePool::from_ref(state);
        Ok(MaybeUser(user_by_token(&pool, token).await?))
    }
}
