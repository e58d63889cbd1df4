// src/services/posts.rs

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        comment::{Comment, CommentRequest},
        notification::NotificationKind,
        post::{Post, PostDetail, PostInput},
        user::CurrentUser,
    },
    repository::{
        categories, comments,
        posts::{self, NewPost},
    },
    services::notifications,
    utils::image::{remove_image, store_image},
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamps a requested page size to `1..=MAX_PAGE_SIZE`.
pub fn page_size(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Maps category names to ids. Every name must exist.
async fn resolve_categories(pool: &SqlitePool, names: &[String]) -> Result<Vec<i64>, AppError> {
    let mut wanted: Vec<String> = names.iter().map(|n| n.trim().to_string()).collect();
    wanted.sort();
    wanted.dedup();

    let found = categories::find_by_names(pool, &wanted).await?;
    if found.len() != wanted.len() {
        let missing: Vec<&str> = wanted
            .iter()
            .filter(|name| !found.iter().any(|c| &c.name == *name))
            .map(String::as_str)
            .collect();
        return Err(AppError::BadRequest(format!(
            "Unknown category: {}",
            missing.join(", ")
        )));
    }
    Ok(found.into_iter().map(|c| c.id).collect())
}

async fn load_post(pool: &SqlitePool, post_id: i64, viewer_id: i64) -> Result<Post, AppError> {
    posts::find_by_id(pool, post_id, viewer_id)
        .await?
        .map(Post::from)
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

pub async fn create(
    pool: &SqlitePool,
    config: &Config,
    author: &CurrentUser,
    input: PostInput,
) -> Result<Post, AppError> {
    // 1. Validate fields and categories
    input.validate()?;
    let category_ids = resolve_categories(pool, &input.categories).await?;

    // 2. Store the image before the row so the URL can be saved with it
    let image_url = match input.image.as_deref() {
        Some(bytes) => Some(store_image(&config.upload_dir, bytes, config.max_image_bytes).await?),
        None => None,
    };

    // 3. Insert post + categories atomically
    let title = input.title.trim();
    let content = input.content.trim();
    let new_post = NewPost {
        user_id: author.id,
        title,
        content,
        image_url: image_url.as_deref(),
    };

    let inserted = async {
        let mut tx = pool.begin().await?;
        let id = posts::create(&mut tx, &new_post).await?;
        posts::set_categories(&mut tx, id, &category_ids).await?;
        tx.commit().await?;
        Ok::<i64, sqlx::Error>(id)
    }
    .await;

    let post_id = match inserted {
        Ok(id) => id,
        Err(e) => {
            if let Some(url) = &image_url {
                remove_image(&config.upload_dir, url).await;
            }
            tracing::error!("Failed to create post: {:?}", e);
            return Err(e.into());
        }
    };

    tracing::info!("User {} created post {}", author.id, post_id);
    load_post(pool, post_id, author.id).await
}

/// Replaces title, text and categories. Only the author may edit.
///
/// A new image replaces the old one; without one the old image is kept.
pub async fn update(
    pool: &SqlitePool,
    config: &Config,
    editor: &CurrentUser,
    post_id: i64,
    input: PostInput,
) -> Result<Post, AppError> {
    let existing = posts::owner(pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    if existing.user_id != editor.id {
        return Err(AppError::Forbidden(
            "You can only edit your own posts".to_string(),
        ));
    }

    input.validate()?;
    let category_ids = resolve_categories(pool, &input.categories).await?;

    let new_image = match input.image.as_deref() {
        Some(bytes) => Some(store_image(&config.upload_dir, bytes, config.max_image_bytes).await?),
        None => None,
    };
    let image_url = new_image.as_deref().or(existing.image_url.as_deref());

    let title = input.title.trim();
    let content = input.content.trim();

    let updated = async {
        let mut tx = pool.begin().await?;
        posts::update(&mut tx, post_id, title, content, image_url).await?;
        posts::set_categories(&mut tx, post_id, &category_ids).await?;
        tx.commit().await
    }
    .await;

    if let Err(e) = updated {
        if let Some(url) = &new_image {
            remove_image(&config.upload_dir, url).await;
        }
        tracing::error!("Failed to update post {}: {:?}", post_id, e);
        return Err(e.into());
    }

    if let (Some(_), Some(old)) = (&new_image, &existing.image_url) {
        remove_image(&config.upload_dir, old).await;
    }

    load_post(pool, post_id, editor.id).await
}

/// The author, a moderator or an admin may delete a post.
pub async fn delete(
    pool: &SqlitePool,
    config: &Config,
    user: &CurrentUser,
    post_id: i64,
) -> Result<(), AppError> {
    let existing = posts::owner(pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if existing.user_id != user.id && !user.role.can_moderate() {
        return Err(AppError::Forbidden(
            "You can only delete your own posts".to_string(),
        ));
    }

    delete_with_image(pool, config, existing.id, existing.image_url.as_deref()).await?;
    tracing::info!("Post {} deleted by user {}", post_id, user.id);
    Ok(())
}

/// Removes a post row (comments, reactions, reports cascade) and its image file.
pub async fn delete_with_image(
    pool: &SqlitePool,
    config: &Config,
    post_id: i64,
    image_url: Option<&str>,
) -> Result<(), AppError> {
    if !posts::delete(pool, post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    if let Some(url) = image_url {
        remove_image(&config.upload_dir, url).await;
    }
    Ok(())
}

pub async fn get(pool: &SqlitePool, post_id: i64, viewer_id: i64) -> Result<PostDetail, AppError> {
    let post = load_post(pool, post_id, viewer_id).await?;
    let comments = comments::list_for_post(pool, post_id, viewer_id).await?;
    Ok(PostDetail { post, comments })
}

// --- Comments ---

pub async fn create_comment(
    pool: &SqlitePool,
    author: &CurrentUser,
    post_id: i64,
    payload: &CommentRequest,
) -> Result<Comment, AppError> {
    payload.validate()?;

    let post = posts::owner(pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let content = payload.content.trim();
    let id = comments::create(pool, post.id, author.id, content).await?;

    notifications::notify(pool, post.user_id, author.id, post.id, NotificationKind::Comment).await;

    comments::find_by_id(pool, id, author.id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Comment vanished after insert".to_string()))
}

/// Only the author may edit a comment.
pub async fn update_comment(
    pool: &SqlitePool,
    editor: &CurrentUser,
    comment_id: i64,
    payload: &CommentRequest,
) -> Result<Comment, AppError> {
    payload.validate()?;

    let existing = comments::owner(pool, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
    if existing.user_id != editor.id {
        return Err(AppError::Forbidden(
            "You can only edit your own comments".to_string(),
        ));
    }

    let content = payload.content.trim();
    comments::update(pool, comment_id, content).await?;

    comments::find_by_id(pool, comment_id, editor.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
}

/// The author, a moderator or an admin may delete a comment.
pub async fn delete_comment(
    pool: &SqlitePool,
    user: &CurrentUser,
    comment_id: i64,
) -> Result<(), AppError> {
    let existing = comments::owner(pool, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if existing.user_id != user.id && !user.role.can_moderate() {
        return Err(AppError::Forbidden(
            "You can only delete your own comments".to_string(),
        ));
    }

    comments::delete(pool, comment_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(page_size(Some(0)), 1);
        assert_eq!(page_size(Some(5)), 5);
        assert_eq!(page_size(Some(1000)), MAX_PAGE_SIZE);
    }
}
