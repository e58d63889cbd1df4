// src/handlers/oauth.rs

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    config::Config,
    error::AppError,
    services::{
        auth,
        oauth::{self, ProviderKind},
    },
    state::AppState,
    utils::cookie::{
        OAUTH_STATE_COOKIE, clear_oauth_state_cookie, get_cookie, oauth_state_cookie,
        session_cookie,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declines.
    pub error: Option<String>,
}

/// Redirects the browser to the provider's consent screen.
#[utoipa::path(
    get,
    path = "/api/auth/{provider}/login",
    params(("provider" = String, Path, description = "google or github")),
    responses(
        (status = 303, description = "Redirect to the provider"),
        (status = 404, description = "Unknown or disabled provider")
    ),
    tag = "auth"
)]
pub async fn oauth_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind: ProviderKind = provider.parse()?;
    let client = oauth::provider(kind, &state.config)?;

    let csrf_state = uuid::Uuid::new_v4().simple().to_string();
    let url = client.authorize_url(&csrf_state, &oauth::redirect_uri(&state.config, kind))?;

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            oauth_state_cookie(&csrf_state, state.config.cookie_secure),
        )]),
        Redirect::to(&url),
    ))
}

/// Completes the provider flow: checks `state`, exchanges the code, logs the user in.
#[utoipa::path(
    get,
    path = "/api/auth/{provider}/callback",
    params(("provider" = String, Path, description = "google or github"), CallbackParams),
    responses(
        (status = 303, description = "Logged in; redirect to FRONTEND_URL"),
        (status = 400, description = "State mismatch or missing code"),
        (status = 401, description = "Provider rejected the code")
    ),
    tag = "auth"
)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let kind: ProviderKind = provider.parse()?;
    let client = oauth::provider(kind, &state.config)?;

    if let Some(error) = params.error {
        return Err(AppError::AuthError(format!("{} sign-in cancelled: {}", kind, error)));
    }

    // 1. CSRF check against the cookie set by oauth_login
    let expected = get_cookie(&headers, OAUTH_STATE_COOKIE);
    match (expected, params.state.as_deref()) {
        (Some(expected), Some(got)) if expected == got => {}
        _ => return Err(AppError::BadRequest("Invalid OAuth state".to_string())),
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    // 2. Exchange and resolve the account
    let identity = client
        .exchange(&state.http, &code, &oauth::redirect_uri(&state.config, kind))
        .await?;
    let user = auth::login_with_oauth(&state.pool, &identity).await?;

    // 3. Start the session
    let ttl = state.config.session_ttl_hours;
    let token = auth::issue_session(&state.pool, user.id, ttl).await?;
    tracing::info!("User {} logged in with {}", user.id, kind);

    let secure = state.config.cookie_secure;
    Ok((
        AppendHeaders([
            (SET_COOKIE, session_cookie(&token, ttl, secure)),
            (SET_COOKIE, clear_oauth_state_cookie(secure)),
        ]),
        landing_redirect(&state.config),
    ))
}

/// The API serves no pages, so the browser goes back to the front end.
fn landing_redirect(config: &Config) -> Redirect {
    Redirect::to(&config.frontend_url)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::http::{StatusCode, header::LOCATION};

    use super::*;

    fn config(frontend_url: &str) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            rust_log: "error".to_string(),
            session_ttl_hours: 3,
            cookie_secure: false,
            rate_limit_per_minute: 60,
            trust_proxy_headers: false,
            upload_dir: PathBuf::from("uploads"),
            max_image_bytes: 1024,
            admin_username: None,
            admin_email: None,
            admin_password: None,
            public_base_url: "http://localhost:8081".to_string(),
            frontend_url: frontend_url.to_string(),
            google: None,
            github: None,
        }
    }

    #[test]
    fn login_lands_on_the_front_end() {
        let response = landing_redirect(&config("https://forum.example/app")).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "https://forum.example/app");
    }
}
