use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Block, ImageRef, ImageUpload, Reference, Slug, Subreddit, User, VoteTally};

pub const DELETED_POST_TITLE: &str = "[DELETED POST]";
pub const DELETED_CONTENT: &str = "[DELETED CONTENT]";

/// Post as returned by read queries, with author and subreddit
/// dereferenced. List queries also fill in votes and comment count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub body: Option<Vec<Block>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub subreddit: Option<Subreddit>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<VoteTally>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
}

impl Post {
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }
}

/// Post document as written on creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub title: String,
    pub slug: Slug,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Block>>,
    pub author: Reference,
    pub subreddit: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub published_at: DateTime<Utc>,
}

// Create post request
#[derive(Debug, Validate, Deserialize)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300))]
    #[serde(deserialize_with = "crate::models::trimmed")]
    pub title: String,
    #[validate(length(max = 40000))]
    pub body: Option<String>,
    #[validate(length(min = 1))]
    pub subreddit_id: String,
    #[validate(nested)]
    pub image: Option<ImageUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Shape of a post read through the post projection
    fn projected_row() -> serde_json::Value {
        json!({
            "_id": "post-1",
            "title": "Hello Rust",
            "slug": "hello-rust",
            "body": [{
                "_type": "block",
                "_key": "b1",
                "style": "normal",
                "markDefs": [],
                "children": [{"_type": "span", "_key": "s1", "text": "First post", "marks": []}]
            }],
            "publishedAt": "2025-03-01T12:00:00Z",
            "author": {
                "_id": "user_1",
                "_type": "user",
                "_rev": "r1",
                "username": "JaneDoe1234",
                "email": "jane@example.com",
                "imageUrl": "https://img.example.com/jane.png",
                "joinedAt": "2025-01-01T00:00:00Z"
            },
            "subreddit": {
                "_id": "sub-1",
                "_type": "subreddit",
                "_rev": "r2",
                "_createdAt": "2025-01-02T00:00:00Z",
                "title": "rust",
                "slug": "rust",
                "description": "Welcome to r/rust",
                "moderator": {
                    "_id": "user_2",
                    "_type": "user",
                    "username": "ModUser5678"
                },
                "createdAt": "2025-01-02T00:00:00Z"
            },
            "image": null,
            "isDeleted": null,
            "votes": {"upvotes": 4, "downvotes": 1},
            "commentCount": 2
        })
    }

    #[test]
    fn decodes_projected_post_with_moderator() {
        let post: Post = serde_json::from_value(projected_row()).unwrap();

        let subreddit = post.subreddit.as_ref().unwrap();
        assert_eq!(subreddit.slug.as_deref(), Some("rust"));
        assert_eq!(subreddit.moderator.as_ref().unwrap().id, "user_2");
        assert_eq!(post.author.as_ref().unwrap().username, "JaneDoe1234");
        assert_eq!(post.votes.unwrap().net_score, 3);
        assert_eq!(post.comment_count, Some(2));
        assert!(!post.is_deleted());
    }

    #[test]
    fn undereferenced_moderator_does_not_decode() {
        let mut row = projected_row();
        row["subreddit"]["moderator"] = json!({"_type": "reference", "_ref": "user_2"});

        assert!(serde_json::from_value::<Post>(row).is_err());
    }
}
