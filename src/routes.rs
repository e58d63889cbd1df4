// src/routes.rs

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, comments, filter, moderation, notifications, oauth, posts, reactions},
    middleware::{
        rate_limit::{RateLimiter, rate_limit_middleware},
        security_headers::with_security_headers,
        session::{admin_middleware, auth_middleware, moderator_middleware},
    },
    openapi::openapi_json,
    state::AppState,
};

/// Room for the multipart framing and text fields around an image.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Assembles the main application router.
///
/// * Public routes: auth, OAuth, feed, single post, categories, OpenAPI, uploads.
/// * Session routes: writing, reacting, personal listings, notifications.
/// * Role-gated routes: moderation (moderator/admin) and admin.
/// * Global middleware, outermost first: Trace, security headers, CORS, rate limit.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let limiter = Arc::new(RateLimiter::new(
        state.config.rate_limit_per_minute,
        state.config.trust_proxy_headers,
    ));
    limiter.spawn_sweeper();

    let require_session = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/{provider}/login", get(oauth::oauth_login))
        .route("/{provider}/callback", get(oauth::oauth_callback))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(require_session()),
        );

    let public_routes = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/categories", get(posts::list_categories))
        .route("/openapi.json", get(openapi_json));

    let session_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/{id}",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route("/posts/{id}/comments", post(comments::create_comment))
        .route("/posts/{id}/reactions", post(reactions::react_to_post))
        .route(
            "/comments/{id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/comments/{id}/reactions", post(reactions::react_to_comment))
        .route("/me/posts", get(filter::my_posts))
        .route("/me/liked", get(filter::liked_posts))
        .route("/me/disliked", get(filter::disliked_posts))
        .route("/me/commented", get(filter::commented_posts))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read", post(notifications::mark_notifications_read))
        .route("/role-requests", post(moderation::request_role))
        .layer(require_session());

    let moderation_routes = Router::new()
        .route("/posts/{id}/report", post(moderation::report_post))
        // Auth first, then the role check
        .layer(middleware::from_fn(moderator_middleware))
        .layer(require_session());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/promote", post(admin::promote_user))
        .route("/users/{id}/demote", post(admin::demote_user))
        .route("/reports", get(admin::list_reports))
        .route("/reports/{id}/accept", post(admin::accept_report))
        .route("/reports/{id}/reject", post(admin::reject_report))
        .route("/requests", get(admin::list_requests))
        .route("/requests/{user_id}/approve", post(admin::approve_request))
        .route("/requests/{user_id}/reject", post(admin::reject_request))
        .route("/categories", post(admin::create_category))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(require_session());

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/moderation", moderation_routes)
        .nest("/admin", admin_routes)
        .merge(public_routes)
        .merge(session_routes);

    let router = Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(
            state.config.max_image_bytes + FORM_OVERHEAD_BYTES,
        ))
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        .layer(cors);

    // Global Middleware (applied from outside in)
    with_security_headers(router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
