// tests/auth_tests.rs

mod common;

use common::{PASSWORD, cookie_from, spawn_app, spawn_app_on_disk, spawn_app_with, unique_name};
use forum::error::AppError;
use forum::services::auth::login_with_oauth;
use forum::services::oauth::{OAuthIdentity, ProviderKind};
use reqwest::header::COOKIE;
use serde_json::json;

#[tokio::test]
async fn unknown_path_is_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/categories"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let headers = response.headers();
    assert_eq!(headers["referrer-policy"], "origin-when-cross-origin");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "deny");
    assert_eq!(headers["x-xss-protection"], "0");
}

#[tokio::test]
async fn register_works() {
    // Arrange
    let app = spawn_app().await;
    let name = unique_name();

    // Act
    let response = app.register(&name, &format!("{}@forum.test", name)).await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], name.as_str());
    assert_eq!(body["role"], "user");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    // Username too short, bad email, weak password
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "yo", "email": "nope", "password": "password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_email_or_username_conflicts() {
    let app = spawn_app().await;
    let name = unique_name();
    let email = format!("{}@forum.test", name);
    assert_eq!(app.register(&name, &email).await.status().as_u16(), 201);

    let same_email = app.register(&unique_name(), &email).await;
    assert_eq!(same_email.status().as_u16(), 409);

    let same_name = app
        .register(&name, &format!("{}@forum.test", unique_name()))
        .await;
    assert_eq!(same_name.status().as_u16(), 409);
}

#[tokio::test]
async fn login_sets_session_cookie_and_me_works() {
    let app = spawn_app().await;
    let name = unique_name();
    let email = format!("{}@forum.test", name);
    app.register(&name, &email).await;

    // Wrong password
    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": "Wrong1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // Right password
    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let raw = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=Lax"));
    let cookie = cookie_from(&response, "session").unwrap();

    let (status, me) = app
        .get_json("/api/auth/me", Some(&common::Session { id: 0, email: email.clone(), cookie }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(me["username"], name.as_str());
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = spawn_app().await;

    let (status, _) = app.get_json("/api/auth/me", None).await;
    assert_eq!(status, 401);

    let response = app
        .client
        .get(app.url("/api/me/posts"))
        .header(COOKIE, "session=not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn new_login_ends_previous_session() {
    let app = spawn_app().await;
    let first = app.new_user().await;

    let second = app.login(&first.email, PASSWORD).await;

    let (status, _) = app.get_json("/api/auth/me", Some(&first)).await;
    assert_eq!(status, 401);
    let (status, _) = app.get_json("/api/auth/me", Some(&second)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn overlapping_logins_leave_one_session() {
    let app = spawn_app_on_disk().await;
    let user = app.new_user().await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = app.client.clone();
            let url = app.url("/api/auth/login");
            let email = user.email.clone();
            tokio::spawn(async move {
                client
                    .post(url)
                    .json(&json!({ "email": email, "password": PASSWORD }))
                    .send()
                    .await
                    .unwrap()
                    .status()
                    .as_u16()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 200);
    }

    let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
        .bind(user.id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(sessions, 1);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let app = spawn_app().await;
    let session = app.new_user().await;

    let (status, _) = app.post_empty("/api/auth/logout", &session).await;
    assert_eq!(status, 200);

    let (status, _) = app.get_json("/api/auth/me", Some(&session)).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_removed() {
    let app = spawn_app().await;
    let session = app.new_user().await;

    sqlx::query("UPDATE sessions SET expires_at = ? WHERE user_id = ?")
        .bind(chrono::Utc::now() - chrono::Duration::minutes(1))
        .bind(session.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, _) = app.get_json("/api/auth/me", Some(&session)).await;
    assert_eq!(status, 401);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
        .bind(session.id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn oauth_login_for_disabled_provider_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/auth/github/login"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn oauth_login_redirects_with_state_cookie() {
    let app = spawn_app_with(|config| {
        config.github = Some(forum::config::OAuthClientConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
        });
    })
    .await;

    let response = app
        .client
        .get(app.url("/api/auth/github/login"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 303);
    let location = response.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("https://github.com/login/oauth/authorize?"));
    assert!(location.contains("client_id=client-123"));

    let state_cookie = cookie_from(&response, "oauth_state").unwrap();
    let state = state_cookie.trim_start_matches("oauth_state=");
    assert!(location.contains(&format!("state={}", state)));

    // A callback whose state does not match the cookie is refused
    let response = app
        .client
        .get(app.url("/api/auth/github/callback?code=abc&state=forged"))
        .header(COOKIE, state_cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn rate_limiter_returns_429() {
    let app = spawn_app_with(|config| config.rate_limit_per_minute = 3).await;

    for _ in 0..3 {
        let response = app.client.get(app.url("/api/categories")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
    let response = app.client.get(app.url("/api/categories")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 429);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = spawn_app().await;

    let (status, doc) = app.get_json("/api/openapi.json", None).await;
    assert_eq!(status, 200);
    assert!(doc["paths"]["/api/posts"].is_object());
    assert!(doc["paths"]["/api/admin/reports/{id}/accept"].is_object());
}

fn identity(provider: ProviderKind, provider_id: &str, email: &str, login: &str) -> OAuthIdentity {
    OAuthIdentity {
        provider,
        provider_id: provider_id.to_string(),
        email: email.to_string(),
        login: login.to_string(),
    }
}

#[tokio::test]
async fn oauth_creates_accounts_with_free_usernames() {
    let app = spawn_app().await;

    let first = login_with_oauth(
        &app.pool,
        &identity(ProviderKind::GitHub, "101", "octo@forum.test", "octo cat"),
    )
    .await
    .unwrap();
    assert_eq!(first.username, "octocat");
    assert_eq!(first.github_id.as_deref(), Some("101"));
    assert!(first.password.is_none());

    // Same login, different person: the name gets a counter
    let second = login_with_oauth(
        &app.pool,
        &identity(ProviderKind::Google, "g-202", "other@forum.test", "octocat"),
    )
    .await
    .unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.username, "octocat1");
    assert_eq!(second.google_id.as_deref(), Some("g-202"));

    // No password on file, so password login is refused
    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "octo@forum.test", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn oauth_email_match_links_existing_account() {
    let app = spawn_app().await;
    let local = app.new_user().await;

    let linked = login_with_oauth(
        &app.pool,
        &identity(ProviderKind::Google, "g-1", &local.email, "someone"),
    )
    .await
    .unwrap();
    assert_eq!(linked.id, local.id);
    assert_eq!(linked.google_id.as_deref(), Some("g-1"));

    // The provider id wins over a changed email
    let again = login_with_oauth(
        &app.pool,
        &identity(ProviderKind::Google, "g-1", "moved@forum.test", "someone"),
    )
    .await
    .unwrap();
    assert_eq!(again.id, local.id);
    assert_eq!(again.email, local.email);

    // The local password keeps working
    let session = app.login(&local.email, PASSWORD).await;
    assert_eq!(session.id, local.id);
}

#[tokio::test]
async fn oauth_email_linked_to_other_provider_account_conflicts() {
    let app = spawn_app().await;
    let local = app.new_user().await;

    login_with_oauth(
        &app.pool,
        &identity(ProviderKind::GitHub, "1", &local.email, "someone"),
    )
    .await
    .unwrap();

    let result = login_with_oauth(
        &app.pool,
        &identity(ProviderKind::GitHub, "2", &local.email, "someone"),
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // A different provider may still be linked to the same account
    let google = login_with_oauth(
        &app.pool,
        &identity(ProviderKind::Google, "g-9", &local.email, "someone"),
    )
    .await
    .unwrap();
    assert_eq!(google.id, local.id);
    assert_eq!(google.github_id.as_deref(), Some("1"));
}
