// src/openapi.rs

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{
    admin, auth, comments, filter, moderation, notifications, oauth, posts, reactions,
};
use crate::models::{
    category::{Category, CreateCategoryRequest},
    comment::{Comment, CommentRequest},
    moderation::{Report, ReportRequest, RoleRequest},
    notification::{Notification, NotificationList},
    post::{Post, PostDetail, PostForm},
    reaction::{ReactionRequest, ReactionResponse},
    user::{CurrentUser, LoginRequest, RegisterRequest, Role, UserResponse},
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Forum API", description = "Posts, comments, reactions and moderation"),
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        oauth::oauth_login,
        oauth::oauth_callback,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        posts::list_categories,
        comments::create_comment,
        comments::update_comment,
        comments::delete_comment,
        reactions::react_to_post,
        reactions::react_to_comment,
        filter::my_posts,
        filter::liked_posts,
        filter::disliked_posts,
        filter::commented_posts,
        notifications::list_notifications,
        notifications::mark_notifications_read,
        moderation::report_post,
        moderation::request_role,
        admin::list_users,
        admin::promote_user,
        admin::demote_user,
        admin::list_reports,
        admin::accept_report,
        admin::reject_report,
        admin::list_requests,
        admin::approve_request,
        admin::reject_request,
        admin::create_category,
    ),
    components(schemas(
        Category,
        CreateCategoryRequest,
        Comment,
        CommentRequest,
        Report,
        ReportRequest,
        RoleRequest,
        Notification,
        NotificationList,
        Post,
        PostDetail,
        PostForm,
        ReactionRequest,
        ReactionResponse,
        CurrentUser,
        LoginRequest,
        RegisterRequest,
        Role,
        UserResponse,
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
