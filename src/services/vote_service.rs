//! Voting on posts and comments.
//!
//! A user holds at most one vote per subject. That is kept by reading the
//! existing vote before every write, not by a store constraint, so two
//! concurrent first votes from the same user can still both be created.

use serde_json::json;

use crate::{
    content::{ContentClient, Patch},
    error::{AppError, Result},
    models::{NewVote, Vote, VoteAction, VoteKind, VoteSubject, VoteTally},
};

/// Write that brings the stored vote in line with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotePlan {
    Create,
    Delete { vote_id: String },
    Switch { vote_id: String, revision: Option<String> },
}

#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub action: VoteAction,
    pub vote_id: String,
    /// The caller's vote after the write.
    pub current: Option<VoteKind>,
}

/// Same kind toggles off, opposite kind switches, nothing creates.
pub fn resolve_vote(existing: Option<&Vote>, requested: VoteKind) -> VotePlan {
    match existing {
        None => VotePlan::Create,
        Some(vote) if vote.vote_type == requested => VotePlan::Delete {
            vote_id: vote.id.clone(),
        },
        Some(vote) => VotePlan::Switch {
            vote_id: vote.id.clone(),
            revision: vote.revision.clone(),
        },
    }
}

fn existing_vote_query(subject: &VoteSubject) -> String {
    format!(
        r#"*[_type == "vote" && {}._ref == $subjectId && user._ref == $userId][0]"#,
        subject.field()
    )
}

fn tally_query(subject: &VoteSubject) -> String {
    let field = subject.field();
    format!(
        r#"{{
  "upvotes": count(*[_type == "vote" && {field}._ref == $subjectId && voteType == "upvote"]),
  "downvotes": count(*[_type == "vote" && {field}._ref == $subjectId && voteType == "downvote"])
}}"#
    )
}

pub async fn find_vote(
    content: &ContentClient,
    subject: &VoteSubject,
    user_id: &str,
) -> Result<Option<Vote>> {
    content
        .fetch(
            &existing_vote_query(subject),
            &[("subjectId", subject.id()), ("userId", user_id)],
        )
        .await
}

pub async fn subject_exists(content: &ContentClient, subject: &VoteSubject) -> Result<bool> {
    let found: Option<String> = content
        .fetch(
            r#"*[_type == $type && _id == $subjectId][0]._id"#,
            &[("type", subject.field()), ("subjectId", subject.id())],
        )
        .await?;

    Ok(found.is_some())
}

/// Casts, removes or switches the user's vote on a subject.
pub async fn cast_vote(
    content: &ContentClient,
    subject: &VoteSubject,
    user_id: &str,
    requested: VoteKind,
) -> Result<VoteOutcome> {
    let existing = find_vote(content, subject, user_id).await?;

    let outcome = match resolve_vote(existing.as_ref(), requested) {
        VotePlan::Create => {
            let vote = NewVote::new(subject, user_id, requested);
            let result = content.create(&vote).await?;
            VoteOutcome {
                action: VoteAction::Created,
                vote_id: result.id,
                current: Some(requested),
            }
        }
        VotePlan::Delete { vote_id } => {
            content.delete(&vote_id).await?;
            VoteOutcome {
                action: VoteAction::Removed,
                vote_id,
                current: None,
            }
        }
        VotePlan::Switch { vote_id, revision } => {
            let patch = Patch::new(vote_id.as_str())
                .if_revision(revision)
                .set("voteType", json!(requested.as_str()));
            content.patch(patch).await.map_err(|e| match e {
                AppError::Conflict(_) => {
                    AppError::Conflict("Vote was changed by another request".to_string())
                }
                other => other,
            })?;
            VoteOutcome {
                action: VoteAction::Switched,
                vote_id,
                current: Some(requested),
            }
        }
    };

    tracing::info!(
        "Vote {} {:?} on {} {} by {}",
        outcome.vote_id,
        outcome.action,
        subject.field(),
        subject.id(),
        user_id
    );

    Ok(outcome)
}

pub async fn get_vote_tally(content: &ContentClient, subject: &VoteSubject) -> Result<VoteTally> {
    content
        .fetch(&tally_query(subject), &[("subjectId", subject.id())])
        .await
}

/// The user's current vote on a subject; `None` for anonymous viewers.
pub async fn get_vote_status(
    content: &ContentClient,
    subject: &VoteSubject,
    user_id: Option<&str>,
) -> Result<Option<VoteKind>> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    Ok(find_vote(content, subject, user_id)
        .await?
        .map(|vote| vote.vote_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reference;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn vote(kind: VoteKind) -> Vote {
        Vote {
            id: "vote-1".to_string(),
            revision: Some("rev-1".to_string()),
            vote_type: kind,
            post: Some(Reference::to("post-1")),
            comment: None,
            user: Reference::to("user_1"),
            created_at: None,
        }
    }

    #[test]
    fn no_vote_creates() {
        assert_eq!(resolve_vote(None, VoteKind::Upvote), VotePlan::Create);
        assert_eq!(resolve_vote(None, VoteKind::Downvote), VotePlan::Create);
    }

    #[test]
    fn same_kind_toggles_off() {
        for kind in [VoteKind::Upvote, VoteKind::Downvote] {
            assert_eq!(
                resolve_vote(Some(&vote(kind)), kind),
                VotePlan::Delete {
                    vote_id: "vote-1".to_string()
                }
            );
        }
    }

    #[test]
    fn opposite_kind_switches_in_place() {
        for (stored, requested) in [
            (VoteKind::Downvote, VoteKind::Upvote),
            (VoteKind::Upvote, VoteKind::Downvote),
        ] {
            assert_eq!(
                resolve_vote(Some(&vote(stored)), requested),
                VotePlan::Switch {
                    vote_id: "vote-1".to_string(),
                    revision: Some("rev-1".to_string()),
                }
            );
        }
    }

    #[test]
    fn queries_target_the_subject_field() {
        let comment = VoteSubject::Comment("c-1".to_string());
        assert!(existing_vote_query(&comment).contains("comment._ref == $subjectId"));
        assert!(tally_query(&comment).contains(r#"comment._ref == $subjectId && voteType == "downvote""#));
    }

    fn client(server: &MockServer) -> ContentClient {
        ContentClient::new(&format!("{}/v1", server.uri()), "test", "token").unwrap()
    }

    async fn mount_existing(server: &MockServer, existing: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/data/query/test"))
            .and(query_param("$userId", "\"user_1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": existing})))
            .expect(1)
            .mount(server)
            .await;
    }

    fn committed(id: &str, operation: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "transactionId": "tx-1",
            "results": [{"id": id, "operation": operation}]
        }))
    }

    #[tokio::test]
    async fn first_vote_creates_document() {
        let server = MockServer::start().await;
        mount_existing(&server, json!(null)).await;
        Mock::given(method("POST"))
            .and(path("/v1/data/mutate/test"))
            .and(body_partial_json(json!({
                "mutations": [{"create": {
                    "_type": "vote",
                    "voteType": "upvote",
                    "post": {"_ref": "post-1"},
                    "user": {"_ref": "user_1"}
                }}]
            })))
            .respond_with(committed("vote-new", "create"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = cast_vote(
            &client(&server),
            &VoteSubject::Post("post-1".to_string()),
            "user_1",
            VoteKind::Upvote,
        )
        .await
        .unwrap();

        assert_eq!(outcome.action, VoteAction::Created);
        assert_eq!(outcome.vote_id, "vote-new");
        assert_eq!(outcome.current, Some(VoteKind::Upvote));
    }

    #[tokio::test]
    async fn repeated_vote_deletes_document() {
        let server = MockServer::start().await;
        mount_existing(
            &server,
            json!({
                "_id": "vote-1", "_rev": "rev-1", "_type": "vote",
                "voteType": "downvote",
                "comment": {"_type": "reference", "_ref": "c-1"},
                "user": {"_type": "reference", "_ref": "user_1"}
            }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/v1/data/mutate/test"))
            .and(body_partial_json(json!({"mutations": [{"delete": {"id": "vote-1"}}]})))
            .respond_with(committed("vote-1", "delete"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = cast_vote(
            &client(&server),
            &VoteSubject::Comment("c-1".to_string()),
            "user_1",
            VoteKind::Downvote,
        )
        .await
        .unwrap();

        assert_eq!(outcome.action, VoteAction::Removed);
        assert_eq!(outcome.current, None);
    }

    #[tokio::test]
    async fn opposite_vote_patches_without_creating() {
        let server = MockServer::start().await;
        mount_existing(
            &server,
            json!({
                "_id": "vote-1", "_rev": "rev-1", "_type": "vote",
                "voteType": "upvote",
                "post": {"_type": "reference", "_ref": "post-1"},
                "user": {"_type": "reference", "_ref": "user_1"}
            }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/v1/data/mutate/test"))
            .and(body_partial_json(json!({
                "mutations": [{"patch": {
                    "id": "vote-1",
                    "ifRevisionID": "rev-1",
                    "set": {"voteType": "downvote"}
                }}]
            })))
            .respond_with(committed("vote-1", "update"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = cast_vote(
            &client(&server),
            &VoteSubject::Post("post-1".to_string()),
            "user_1",
            VoteKind::Downvote,
        )
        .await
        .unwrap();

        assert_eq!(outcome.action, VoteAction::Switched);
        assert_eq!(outcome.vote_id, "vote-1");
        assert_eq!(outcome.current, Some(VoteKind::Downvote));
    }

    #[tokio::test]
    async fn concurrent_switch_surfaces_as_conflict() {
        let server = MockServer::start().await;
        mount_existing(
            &server,
            json!({
                "_id": "vote-1", "_rev": "stale", "voteType": "upvote",
                "post": {"_ref": "post-1"}, "user": {"_ref": "user_1"}
            }),
        )
        .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {"description": "Document revision mismatch"}
            })))
            .mount(&server)
            .await;

        let error = cast_vote(
            &client(&server),
            &VoteSubject::Post("post-1".to_string()),
            "user_1",
            VoteKind::Downvote,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn tally_nets_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/data/query/test"))
            .and(query_param("$subjectId", "\"post-1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"upvotes": 5, "downvotes": 8}
            })))
            .mount(&server)
            .await;

        let tally = get_vote_tally(&client(&server), &VoteSubject::Post("post-1".to_string()))
            .await
            .unwrap();

        assert_eq!(tally, VoteTally::new(5, 8));
        assert_eq!(tally.net_score, -3);
    }

    #[tokio::test]
    async fn anonymous_status_skips_the_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let status = get_vote_status(
            &client(&server),
            &VoteSubject::Post("post-1".to_string()),
            None,
        )
        .await
        .unwrap();

        assert_eq!(status, None);
    }
}
