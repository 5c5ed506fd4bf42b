use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::models::Reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

/// The document a vote is cast on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteSubject {
    Post(String),
    Comment(String),
}

impl VoteSubject {
    pub fn id(&self) -> &str {
        match self {
            VoteSubject::Post(id) | VoteSubject::Comment(id) => id,
        }
    }

    /// Document type of the subject, which is also the vote field that
    /// references it.
    pub fn field(&self) -> &'static str {
        match self {
            VoteSubject::Post(_) => "post",
            VoteSubject::Comment(_) => "comment",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub vote_type: VoteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Reference>,
    pub user: Reference,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Vote document as written on creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVote {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Reference>,
    pub user: Reference,
    pub vote_type: VoteKind,
    pub created_at: DateTime<Utc>,
}

impl NewVote {
    pub fn new(subject: &VoteSubject, user_id: &str, kind: VoteKind) -> Self {
        let (post, comment) = match subject {
            VoteSubject::Post(id) => (Some(Reference::to(id.as_str())), None),
            VoteSubject::Comment(id) => (None, Some(Reference::to(id.as_str()))),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            doc_type: "vote",
            post,
            comment,
            user: Reference::to(user_id),
            vote_type: kind,
            created_at: Utc::now(),
        }
    }
}

/// Upvote and downvote counts for one subject. The net score is always
/// derived from the two counts, whatever the source sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TallyCounts")]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
    pub net_score: i64,
}

#[derive(Deserialize)]
struct TallyCounts {
    #[serde(default)]
    upvotes: u64,
    #[serde(default)]
    downvotes: u64,
}

impl From<TallyCounts> for VoteTally {
    fn from(counts: TallyCounts) -> Self {
        VoteTally::new(counts.upvotes, counts.downvotes)
    }
}

impl VoteTally {
    pub fn new(upvotes: u64, downvotes: u64) -> Self {
        Self {
            upvotes,
            downvotes,
            net_score: upvotes as i64 - downvotes as i64,
        }
    }
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: VoteKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Created,
    Removed,
    Switched,
}

// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub action: VoteAction,
    pub user_vote: Option<VoteKind>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteSummary {
    pub user_vote: Option<VoteKind>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
}

impl VoteSummary {
    pub fn new(tally: VoteTally, user_vote: Option<VoteKind>) -> Self {
        Self {
            user_vote,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            score: tally.net_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tally_recomputes_net_score() {
        let tally: VoteTally =
            serde_json::from_value(json!({"upvotes": 2, "downvotes": 5, "netScore": 99})).unwrap();

        assert_eq!(tally, VoteTally::new(2, 5));
        assert_eq!(tally.net_score, -3);
    }

    #[test]
    fn tally_defaults_missing_counts_to_zero() {
        let tally: VoteTally = serde_json::from_value(json!({"upvotes": 4})).unwrap();
        assert_eq!(tally.net_score, 4);
        assert_eq!(
            serde_json::to_value(tally).unwrap(),
            json!({"upvotes": 4, "downvotes": 0, "netScore": 4})
        );
    }

    #[test]
    fn net_score_is_difference_of_counts() {
        for (up, down) in [(0, 0), (1, 0), (0, 1), (7, 3), (3, 7), (1000, 999)] {
            let tally = VoteTally::new(up, down);
            assert_eq!(tally.net_score, up as i64 - down as i64);
        }
    }

    #[test]
    fn new_vote_references_only_its_subject() {
        let vote = NewVote::new(
            &VoteSubject::Comment("comment-1".to_string()),
            "user_1",
            VoteKind::Downvote,
        );
        let stored = serde_json::to_value(&vote).unwrap();

        assert_eq!(stored["_type"], "vote");
        assert_eq!(stored["voteType"], "downvote");
        assert_eq!(stored["comment"]["_ref"], "comment-1");
        assert_eq!(stored["user"]["_ref"], "user_1");
        assert!(stored.get("post").is_none());
    }

    #[test]
    fn kinds_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(VoteKind::Upvote).unwrap(), "upvote");
        let kind: VoteKind = serde_json::from_value(serde_json::json!("downvote")).unwrap();
        assert_eq!(kind, VoteKind::Downvote);
        assert!(serde_json::from_value::<VoteKind>(serde_json::json!("sideways")).is_err());
    }
}
