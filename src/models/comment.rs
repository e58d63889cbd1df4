use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::validate::validate_comment_text;

/// A comment joined with its author and derived reaction counts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub likes: i64,
    pub dislikes: i64,
    pub my_vote: Option<i64>,
}

/// DTO for creating or editing a comment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentRequest {
    #[validate(custom(function = "validate_comment_text"))]
    pub content: String,
}
