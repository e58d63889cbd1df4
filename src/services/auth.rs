// src/services/auth.rs

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    db,
    error::{AppError, is_unique_violation},
    models::user::{CurrentUser, LoginRequest, RegisterRequest, Role, User},
    repository::{
        sessions,
        users::{self, NewUser, ProviderColumn},
    },
    services::oauth::OAuthIdentity,
    utils::hash::{hash_password, verify_password},
};

/// Creates a local account with the `user` role.
pub async fn register(pool: &SqlitePool, payload: &RegisterRequest) -> Result<User, AppError> {
    payload.validate()?;

    let username = payload.username.trim();
    let email = payload.email.trim();

    // Friendly messages first; the UNIQUE constraints still catch races.
    if users::find_by_email(pool, email).await?.is_some() {
        return Err(AppError::Conflict("Email is already in use".to_string()));
    }
    if users::find_by_username(pool, username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            username
        )));
    }

    let hashed_password = hash_password(&payload.password)?;
    let new_user = NewUser {
        username,
        email,
        password: Some(hashed_password.as_str()),
        ..Default::default()
    };

    let id = users::create(pool, &new_user, Role::User)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Username or email already exists".to_string())
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!("Registered user {} ({})", username, id);

    users::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("User vanished after insert".to_string()))
}

/// Checks email and password. OAuth-only accounts cannot log in this way.
pub async fn login(pool: &SqlitePool, payload: &LoginRequest) -> Result<User, AppError> {
    payload.validate()?;

    let user = users::find_by_email(pool, payload.email.trim())
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    let Some(hash) = user.password.as_deref() else {
        return Err(AppError::AuthError(
            "This account signs in with Google or GitHub".to_string(),
        ));
    };

    if !verify_password(&payload.password, hash)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    Ok(user)
}

/// Starts a new session for `user_id`, ending any earlier one.
///
/// Returns the opaque token to put in the session cookie.
pub async fn issue_session(
    pool: &SqlitePool,
    user_id: i64,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::hours(ttl_hours);

    let mut tx = db::begin_immediate(pool).await?;
    let ended = sessions::delete_by_user(&mut *tx, user_id).await?;
    sessions::create(&mut *tx, &token, user_id, expires_at).await?;
    tx.commit().await?;

    if ended > 0 {
        tracing::debug!("Replaced {} earlier session(s) of user {}", ended, user_id);
    }
    Ok(token)
}

pub async fn logout(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sessions::delete_by_token(pool, token).await?;
    Ok(())
}

/// Resolves a session token to its user. Expired sessions are deleted.
pub async fn user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<CurrentUser>, AppError> {
    let Some(session) = sessions::find_with_user(pool, token).await? else {
        return Ok(None);
    };

    if session.expires_at <= Utc::now() {
        sessions::delete_by_token(pool, &session.token).await?;
        return Ok(None);
    }

    let role = session.role.parse().unwrap_or(Role::User);
    Ok(Some(CurrentUser {
        id: session.user_id,
        username: session.username,
        email: session.email,
        role,
    }))
}

/// Finds or creates the account behind an OAuth identity.
///
/// 1. An account already linked to the provider id wins.
/// 2. Otherwise an account with the same email gets the provider id linked.
/// 3. Otherwise a fresh account is created with a unique username.
pub async fn login_with_oauth(pool: &SqlitePool, identity: &OAuthIdentity) -> Result<User, AppError> {
    let column = identity.provider.column();

    if let Some(user) = users::find_by_provider_id(pool, column, &identity.provider_id).await? {
        return Ok(user);
    }

    if let Some(user) = users::find_by_email(pool, &identity.email).await? {
        let linked = users::link_provider(pool, user.id, column, &identity.provider_id).await?;
        if !linked {
            // The account is already tied to a different id at this provider.
            return Err(AppError::Conflict(format!(
                "This email is linked to another {} account",
                identity.provider
            )));
        }
        tracing::info!("Linked {} account to user {}", identity.provider, user.id);
        return users::find_by_id(pool, user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()));
    }

    let username = unique_username(pool, &identity.login).await?;
    let (google_id, github_id) = match column {
        ProviderColumn::Google => (Some(identity.provider_id.as_str()), None),
        ProviderColumn::GitHub => (None, Some(identity.provider_id.as_str())),
    };
    let new_user = NewUser {
        username: &username,
        email: &identity.email,
        password: None,
        google_id,
        github_id,
    };

    let id = users::create(pool, &new_user, Role::User).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Account already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;
    tracing::info!("Created user {} from {} login", username, identity.provider);

    users::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("User vanished after insert".to_string()))
}

/// Derives a free username from a provider login, appending a counter on clashes.
async fn unique_username(pool: &SqlitePool, login: &str) -> Result<String, AppError> {
    let base = sanitize_username(login);

    if users::find_by_username(pool, &base).await?.is_none() {
        return Ok(base);
    }
    for n in 1..1000 {
        let candidate = with_suffix(&base, n);
        if users::find_by_username(pool, &candidate).await?.is_none() {
            return Ok(candidate);
        }
    }

    let short_id = uuid::Uuid::new_v4().simple().to_string();
    Ok(format!("user_{}", &short_id[..8]))
}

/// Keeps `[a-zA-Z0-9_.-]`, clamps to 3..=20 characters.
fn sanitize_username(login: &str) -> String {
    let mut name: String = login
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(20)
        .collect();
    while name.len() < 3 {
        name.push('_');
    }
    name
}

fn with_suffix(base: &str, n: u32) -> String {
    let suffix = n.to_string();
    let keep = base.len().min(20 - suffix.len());
    format!("{}{}", &base[..keep], suffix)
}
