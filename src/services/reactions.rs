// src/services/reactions.rs

use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::{
        notification::NotificationKind,
        reaction::{ReactionResponse, ReactionTarget, Vote},
    },
    repository::{comments, posts, reactions},
    services::notifications,
};

/// What a toggle did to the caller's stored vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Inserted,
    Changed,
    Removed,
}

/// Decides the transition from the current vote to the requested one.
pub fn decide(current: Option<i64>, requested: Vote) -> Toggle {
    match current {
        None => Toggle::Inserted,
        Some(v) if v == requested.value() => Toggle::Removed,
        Some(_) => Toggle::Changed,
    }
}

/// Applies a like/dislike to a post or comment.
///
/// Repeating the same vote removes it, the opposite vote flips it.
/// A new or changed vote on a post notifies the post's author.
pub async fn toggle(
    pool: &SqlitePool,
    user_id: i64,
    target: ReactionTarget,
    vote: Vote,
) -> Result<ReactionResponse, AppError> {
    // 1. Target must exist; remember the post author for notifications
    let post_author = match target {
        ReactionTarget::Post(id) => {
            let post = posts::owner(pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
            Some(post.user_id)
        }
        ReactionTarget::Comment(id) => {
            comments::owner(pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
            None
        }
    };

    // 2. Apply the transition inside one transaction
    let mut tx = db::begin_immediate(pool).await?;
    let current = reactions::find(&mut *tx, user_id, target).await?;
    let outcome = decide(current, vote);
    match outcome {
        Toggle::Inserted => reactions::insert(&mut *tx, user_id, target, vote).await?,
        Toggle::Changed => reactions::update(&mut *tx, user_id, target, vote).await?,
        Toggle::Removed => reactions::delete(&mut *tx, user_id, target).await?,
    }
    let counts = reactions::counts(&mut *tx, target).await?;
    tx.commit().await?;

    // 3. Notify
    if let (Some(author_id), ReactionTarget::Post(post_id)) = (post_author, target) {
        if outcome != Toggle::Removed {
            notifications::notify(pool, author_id, user_id, post_id, NotificationKind::from(vote))
                .await;
        }
    }

    Ok(ReactionResponse {
        my_vote: (outcome != Toggle::Removed).then_some(vote.value()),
        likes: counts.likes,
        dislikes: counts.dislikes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_transitions() {
        assert_eq!(decide(None, Vote::Like), Toggle::Inserted);
        assert_eq!(decide(Some(1), Vote::Like), Toggle::Removed);
        assert_eq!(decide(Some(-1), Vote::Dislike), Toggle::Removed);
        assert_eq!(decide(Some(-1), Vote::Like), Toggle::Changed);
        assert_eq!(decide(Some(1), Vote::Dislike), Toggle::Changed);
    }
}
