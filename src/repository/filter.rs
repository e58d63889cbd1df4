// src/repository/filter.rs
//
// Per-user post listings backing the `/api/me/*` routes.

use sqlx::SqliteExecutor;

use crate::models::post::PostRow;
use crate::repository::posts::{push_page, select_posts};

pub async fn by_author<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let mut builder = select_posts(user_id);
    builder.push(" AND p.user_id = ");
    builder.push_bind(user_id);
    push_page(&mut builder, cursor, limit);
    builder.build_query_as::<PostRow>().fetch_all(db).await
}

/// Posts the user voted on with `vote` (1 liked, -1 disliked).
pub async fn by_vote<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    vote: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let mut builder = select_posts(user_id);
    builder.push(" AND EXISTS (SELECT 1 FROM reactions r WHERE r.post_id = p.id AND r.user_id = ");
    builder.push_bind(user_id);
    builder.push(" AND r.vote = ");
    builder.push_bind(vote);
    builder.push(")");
    push_page(&mut builder, cursor, limit);
    builder.build_query_as::<PostRow>().fetch_all(db).await
}

pub async fn commented_by<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let mut builder = select_posts(user_id);
    builder.push(" AND EXISTS (SELECT 1 FROM comments c WHERE c.post_id = p.id AND c.user_id = ");
    builder.push_bind(user_id);
    builder.push(")");
    push_page(&mut builder, cursor, limit);
    builder.build_query_as::<PostRow>().fetch_all(db).await
}
