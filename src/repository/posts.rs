use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

use crate::models::post::PostRow;

const POST_COLUMNS: &str = r#"
    SELECT
        p.id, p.user_id, u.username AS author, p.title, p.content, p.image_url,
        p.created_at, p.updated_at,
        (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.id AND r.vote = 1) AS likes,
        (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.id AND r.vote = -1) AS dislikes,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
        (SELECT GROUP_CONCAT(cat.name, ',')
           FROM post_categories pc JOIN categories cat ON cat.id = pc.category_id
          WHERE pc.post_id = p.id) AS categories,
        (SELECT r.vote FROM reactions r WHERE r.post_id = p.id AND r.user_id = "#;

const POST_FROM: &str = r#") AS my_vote
    FROM posts p
    JOIN users u ON u.id = p.user_id
    WHERE 1 = 1"#;

/// Starts a post projection for `viewer_id` (0 for anonymous).
///
/// Callers append `AND ...` conditions, ordering and limits.
pub(crate) fn select_posts<'a>(viewer_id: i64) -> QueryBuilder<'a, Sqlite> {
    let mut builder = QueryBuilder::new(POST_COLUMNS);
    builder.push_bind(viewer_id);
    builder.push(POST_FROM);
    builder
}

/// Appends keyset pagination: rows older than `cursor`, newest first.
pub(crate) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, cursor: Option<i64>, limit: i64) {
    if let Some(cursor) = cursor {
        builder.push(" AND p.id < ");
        builder.push_bind(cursor);
    }
    builder.push(" ORDER BY p.id DESC LIMIT ");
    builder.push_bind(limit);
}

/// Fields for inserting a post.
#[derive(Debug)]
pub struct NewPost<'a> {
    pub user_id: i64,
    pub title: &'a str,
    pub content: &'a str,
    pub image_url: Option<&'a str>,
}

/// Inserts a post. Runs on a connection so it can join the caller's transaction.
pub async fn create(conn: &mut SqliteConnection, post: &NewPost<'_>) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (user_id, title, content, image_url, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(post.user_id)
    .bind(post.title)
    .bind(post.content)
    .bind(post.image_url)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Replaces the category set of a post.
pub async fn set_categories(
    conn: &mut SqliteConnection,
    post_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    for category_id in category_ids {
        sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(category_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn update(
    conn: &mut SqliteConnection,
    post_id: i64,
    title: &str,
    content: &str,
    image_url: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE posts SET title = ?, content = ?, image_url = ?, updated_at = ? WHERE id = ?",
    )
    .bind(title)
    .bind(content)
    .bind(image_url)
    .bind(Utc::now())
    .bind(post_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    post_id: i64,
    viewer_id: i64,
) -> Result<Option<PostRow>, sqlx::Error> {
    let mut builder = select_posts(viewer_id);
    builder.push(" AND p.id = ");
    builder.push_bind(post_id);
    builder.build_query_as::<PostRow>().fetch_optional(db).await
}

/// Minimal post facts for ownership checks, moderation and notifications.
#[derive(Debug, Clone, FromRow)]
pub struct PostOwner {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub image_url: Option<String>,
}

pub async fn owner<'e>(db: impl SqliteExecutor<'e>, post_id: i64) -> Result<Option<PostOwner>, sqlx::Error> {
    sqlx::query_as::<_, PostOwner>("SELECT id, user_id, title, image_url FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(db)
        .await
}

/// Newest first, optionally restricted to posts tagged with any of `category_names`.
pub async fn list<'e>(
    db: impl SqliteExecutor<'e>,
    viewer_id: i64,
    cursor: Option<i64>,
    limit: i64,
    category_names: &[String],
) -> Result<Vec<PostRow>, sqlx::Error> {
    let mut builder = select_posts(viewer_id);

    if !category_names.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM post_categories pc JOIN categories cat ON cat.id = pc.category_id \
             WHERE pc.post_id = p.id AND cat.name IN (",
        );
        let mut separated = builder.separated(", ");
        for name in category_names {
            separated.push_bind(name.clone());
        }
        separated.push_unseparated("))");
    }

    push_page(&mut builder, cursor, limit);
    builder.build_query_as::<PostRow>().fetch_all(db).await
}
