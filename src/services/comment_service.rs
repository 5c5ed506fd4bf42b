use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    content::{ContentClient, Patch},
    error::{AppError, Result},
    models::{Comment, DELETED_CONTENT, NewComment, Reference},
};

/// Shared projection for comment threads. `$userId` is the viewer, or an
/// empty string for anonymous readers.
const THREAD_PROJECTION: &str = r#"{
    _id,
    content,
    createdAt,
    post,
    parentComment,
    isDeleted,
    "author": author->,
    "replyCount": count(*[_type == "comment" && parentComment._ref == ^._id]),
    "votes": {
        "upvotes": count(*[_type == "vote" && comment._ref == ^._id && voteType == "upvote"]),
        "downvotes": count(*[_type == "vote" && comment._ref == ^._id && voteType == "downvote"])
    },
    "userVote": *[_type == "vote" && comment._ref == ^._id && user._ref == $userId][0].voteType
}"#;

/// Highest net score first; ties go to the newest comment.
pub fn sort_thread(comments: &mut [Comment]) {
    comments.sort_by(|a, b| {
        b.net_score()
            .cmp(&a.net_score())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

pub async fn get_comment_by_id(content: &ContentClient, comment_id: &str) -> Result<Option<Comment>> {
    content
        .fetch(
            r#"*[_type == "comment" && _id == $commentId][0] {
                _id,
                content,
                createdAt,
                post,
                parentComment,
                isDeleted,
                "author": author->
            }"#,
            &[("commentId", comment_id)],
        )
        .await
}

pub async fn get_post_comments(
    content: &ContentClient,
    post_id: &str,
    viewer_id: Option<&str>,
) -> Result<Vec<Comment>> {
    let query = format!(
        r#"*[_type == "comment" && post._ref == $postId && !defined(parentComment)] {}"#,
        THREAD_PROJECTION
    );

    let mut comments: Vec<Comment> = content
        .fetch(
            &query,
            &[("postId", post_id), ("userId", viewer_id.unwrap_or_default())],
        )
        .await?;

    sort_thread(&mut comments);
    Ok(comments)
}

pub async fn get_comment_replies(
    content: &ContentClient,
    comment_id: &str,
    viewer_id: Option<&str>,
) -> Result<Vec<Comment>> {
    let query = format!(
        r#"*[_type == "comment" && parentComment._ref == $commentId] {}"#,
        THREAD_PROJECTION
    );

    let mut replies: Vec<Comment> = content
        .fetch(
            &query,
            &[("commentId", comment_id), ("userId", viewer_id.unwrap_or_default())],
        )
        .await?;

    sort_thread(&mut replies);
    Ok(replies)
}

pub struct CommentDraft<'a> {
    pub content: &'a str,
    pub post_id: &'a str,
    pub user_id: &'a str,
    pub parent_comment_id: Option<&'a str>,
}

pub async fn add_comment(content: &ContentClient, draft: CommentDraft<'_>) -> Result<Comment> {
    let document = NewComment {
        id: Uuid::new_v4().to_string(),
        doc_type: "comment",
        content: draft.content.to_string(),
        author: Reference::to(draft.user_id),
        post: Reference::to(draft.post_id),
        parent_comment: draft.parent_comment_id.map(Reference::to),
        created_at: Utc::now(),
    };

    let result = content.create(&document).await?;
    tracing::info!(
        "Comment {} added to post {} by {}",
        result.id,
        draft.post_id,
        draft.user_id
    );

    get_comment_by_id(content, &result.id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Comment {} missing after create", result.id)))
}

/// Soft-deletes a comment; replies stay attached to it.
pub async fn delete_comment(content: &ContentClient, comment_id: &str, user_id: &str) -> Result<()> {
    let comment = get_comment_by_id(content, comment_id)
        .await?
        .filter(|comment| !comment.is_deleted())
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let author_id = comment.author.as_ref().map(|author| author.id.as_str());
    if author_id != Some(user_id) {
        return Err(AppError::Authorization(
            "You can only delete your own comments".to_string(),
        ));
    }

    let patch = Patch::new(comment.id.as_str())
        .set("isDeleted", json!(true))
        .set("content", json!(DELETED_CONTENT));
    content.patch(patch).await?;

    tracing::info!("Comment {} deleted by {}", comment.id, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteTally;
    use chrono::{Duration, TimeZone};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn comment(id: &str, up: u64, down: u64, minutes: i64) -> Comment {
        Comment {
            id: id.to_string(),
            content: String::new(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)),
            author: None,
            post: None,
            parent_comment: None,
            is_deleted: None,
            reply_count: None,
            votes: Some(VoteTally::new(up, down)),
            user_vote: None,
        }
    }

    #[test]
    fn threads_sort_by_score_then_recency() {
        let mut thread = vec![
            comment("low", 0, 2, 0),
            comment("old-top", 5, 1, 0),
            comment("new-top", 4, 0, 10),
            comment("mid", 1, 0, 5),
        ];

        sort_thread(&mut thread);

        let order: Vec<_> = thread.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["new-top", "old-top", "mid", "low"]);
    }

    #[tokio::test]
    async fn anonymous_readers_query_with_empty_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/data/query/test"))
            .and(query_param("$userId", "\"\""))
            .and(query_param("$postId", "\"post-1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"_id": "c-1", "content": "first", "votes": {"upvotes": 0, "downvotes": 1}},
                    {"_id": "c-2", "content": "second", "votes": {"upvotes": 3, "downvotes": 0},
                     "userVote": null, "replyCount": 2}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ContentClient::new(&format!("{}/v1", server.uri()), "test", "token").unwrap();
        let comments = get_post_comments(&client, "post-1", None).await.unwrap();

        assert_eq!(comments[0].id, "c-2");
        assert_eq!(comments[0].reply_count, Some(2));
        assert_eq!(comments[1].net_score(), -1);
    }

    #[tokio::test]
    async fn only_the_author_deletes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "_id": "c-1",
                    "content": "hello",
                    "author": {"_id": "user_author", "username": "author1234"}
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ContentClient::new(&format!("{}/v1", server.uri()), "test", "token").unwrap();
        let error = delete_comment(&client, "c-1", "user_other").await.unwrap_err();

        assert!(matches!(error, AppError::Authorization(_)));
    }
}
