use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a reaction is attached to. A reaction always has exactly one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Post(i64),
    Comment(i64),
}

impl ReactionTarget {
    /// Column in `reactions` holding the target id.
    pub fn column(self) -> &'static str {
        match self {
            ReactionTarget::Post(_) => "post_id",
            ReactionTarget::Comment(_) => "comment_id",
        }
    }

    pub fn id(self) -> i64 {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => id,
        }
    }
}

/// A like (+1) or a dislike (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn value(self) -> i64 {
        match self {
            Vote::Like => 1,
            Vote::Dislike => -1,
        }
    }
}

impl TryFrom<i64> for Vote {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Vote::Like),
            -1 => Ok(Vote::Dislike),
            other => Err(format!("vote must be 1 or -1, got {}", other)),
        }
    }
}

impl From<Vote> for i64 {
    fn from(vote: Vote) -> Self {
        vote.value()
    }
}

/// DTO for reacting to a post or comment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReactionRequest {
    /// 1 for like, -1 for dislike.
    #[schema(value_type = i64)]
    pub vote: Vote,
}

/// State of a target after a reaction toggle.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReactionResponse {
    /// The caller's vote after the toggle; null when it was toggled off.
    pub my_vote: Option<i64>,
    pub likes: i64,
    pub dislikes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_parses_only_plus_minus_one() {
        let like: ReactionRequest = serde_json::from_str(r#"{"vote": 1}"#).unwrap();
        assert_eq!(like.vote, Vote::Like);
        let dislike: ReactionRequest = serde_json::from_str(r#"{"vote": -1}"#).unwrap();
        assert_eq!(dislike.vote, Vote::Dislike);
        assert!(serde_json::from_str::<ReactionRequest>(r#"{"vote": 0}"#).is_err());
        assert!(serde_json::from_str::<ReactionRequest>(r#"{"vote": 2}"#).is_err());
    }

    #[test]
    fn target_column_matches_variant() {
        assert_eq!(ReactionTarget::Post(4).column(), "post_id");
        assert_eq!(ReactionTarget::Comment(9).column(), "comment_id");
        assert_eq!(ReactionTarget::Comment(9).id(), 9);
    }
}
