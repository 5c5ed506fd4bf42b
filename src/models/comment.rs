use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Reference, User, VoteKind, VoteTally};

/// Comment as returned by read queries. Thread queries fill in the reply
/// count, the vote tally and the viewer's own vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub post: Option<Reference>,
    #[serde(default)]
    pub parent_comment: Option<Reference>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<VoteTally>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<VoteKind>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    pub fn net_score(&self) -> i64 {
        self.votes.map(|votes| votes.net_score).unwrap_or(0)
    }
}

/// Comment document as written on creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub content: String,
    pub author: Reference,
    pub post: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<Reference>,
    pub created_at: DateTime<Utc>,
}

// Create comment request
#[derive(Debug, Validate, Deserialize)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10000))]
    #[serde(deserialize_with = "crate::models::trimmed")]
    pub content: String,
    #[validate(length(min = 1))]
    pub post_id: String,
    pub parent_comment_id: Option<String>,
}
