use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_REPORT_REASON: &str = "Breaks forum rules";

/// A pending report joined with the reporter and the reported post.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub reporter_id: i64,
    pub reporter_name: String,
    pub reporter_email: String,
    pub reason: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for reporting a post. The reason is optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ReportRequest {
    #[validate(length(min = 4, max = 200, message = "Reason must be between 4 and 200 characters"))]
    pub reason: Option<String>,
}

/// A user waiting for the moderator role.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
