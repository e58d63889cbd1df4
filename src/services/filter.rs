use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::post::Post,
    repository::{filter, posts},
    services::posts::page_size,
};

/// Which personal listing to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    Mine,
    Liked,
    Disliked,
    Commented,
}

/// The public feed. With `names` set, only posts carrying any of those categories.
pub async fn by_categories(
    pool: &SqlitePool,
    viewer_id: i64,
    names: &[String],
    cursor: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<Post>, AppError> {
    let rows = posts::list(pool, viewer_id, cursor, page_size(limit), names).await?;
    Ok(rows.into_iter().map(Post::from).collect())
}

pub async fn for_user(
    pool: &SqlitePool,
    user_id: i64,
    which: PostFilter,
    cursor: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<Post>, AppError> {
    let limit = page_size(limit);
    let rows = match which {
        PostFilter::Mine => filter::by_author(pool, user_id, cursor, limit).await?,
        PostFilter::Liked => filter::by_vote(pool, user_id, 1, cursor, limit).await?,
        PostFilter::Disliked => filter::by_vote(pool, user_id, -1, cursor, limit).await?,
        PostFilter::Commented => filter::commented_by(pool, user_id, cursor, limit).await?,
    };
    Ok(rows.into_iter().map(Post::from).collect())
}
