use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::comment::Comment;
use crate::utils::validate::{validate_post_text, validate_post_title};

/// A post joined with its author, derived reaction counts and categories.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: i64,
    pub user_id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub likes: i64,
    pub dislikes: i64,
    pub comments_count: i64,
    /// Comma-joined category names (GROUP_CONCAT).
    pub categories: Option<String>,
    /// The viewer's vote on this post, if any.
    pub my_vote: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub likes: i64,
    pub dislikes: i64,
    pub comments_count: i64,
    pub categories: Vec<String>,
    /// UI helper: +1 / -1 when the current user has reacted, null otherwise.
    pub my_vote: Option<i64>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let mut categories: Vec<String> = row
            .categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        categories.sort();

        Self {
            id: row.id,
            author_id: row.user_id,
            author: row.author,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            likes: row.likes,
            dislikes: row.dislikes,
            comments_count: row.comments_count,
            categories,
            my_vote: row.my_vote,
        }
    }
}

/// A post together with its comment thread.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Post fields collected from a multipart form.
#[derive(Debug, Default, Validate)]
pub struct PostInput {
    #[validate(custom(function = "validate_post_title"))]
    pub title: String,

    #[validate(custom(function = "validate_post_text"))]
    pub content: String,

    #[validate(length(min = 1, message = "Choose at least one category"))]
    pub categories: Vec<String>,

    /// Raw bytes of the optional `image` part.
    pub image: Option<Vec<u8>>,
}

/// Shape of the multipart body accepted by create/update (documentation only).
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    /// Repeat the field once per category name.
    pub categories: Vec<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListParams {
    /// Cursor for pagination: the id of the last post in the previous page.
    pub cursor: Option<i64>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,

    /// Comma-separated category names; a post matches if it has any of them.
    pub categories: Option<String>,
}

impl PostListParams {
    pub fn category_names(&self) -> Vec<String> {
        self.categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Pagination for the personal listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    pub cursor: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(categories: Option<&str>) -> PostRow {
        PostRow {
            id: 1,
            user_id: 2,
            author: "bob".into(),
            title: "Title".into(),
            content: "Body".into(),
            image_url: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
            likes: 3,
            dislikes: 1,
            comments_count: 0,
            categories: categories.map(str::to_string),
            my_vote: Some(1),
        }
    }

    #[test]
    fn categories_are_split_and_sorted() {
        let post = Post::from(row(Some("Other,IT,Economy")));
        assert_eq!(post.categories, vec!["Economy", "IT", "Other"]);
        assert_eq!(post.author_id, 2);
    }

    #[test]
    fn missing_categories_become_empty() {
        assert!(Post::from(row(None)).categories.is_empty());
    }

    #[test]
    fn list_params_parse_category_names() {
        let params = PostListParams {
            cursor: None,
            limit: None,
            categories: Some(" IT, ,Medicine ".into()),
        };
        assert_eq!(params.category_names(), vec!["IT", "Medicine"]);
    }

    #[test]
    fn post_input_requires_a_category() {
        let input = PostInput {
            title: "Hello".into(),
            content: "Some text".into(),
            categories: vec![],
            image: None,
        };
        assert!(input.validate().unwrap_err().field_errors().contains_key("categories"));
    }
}
