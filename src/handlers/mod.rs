pub mod comments;
pub mod posts;
pub mod subreddits;
pub mod users;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{VoteKind, VoteResponse, VoteSubject, VoteSummary},
    services::vote_service,
};

fn not_found(subject: &VoteSubject) -> AppError {
    match subject {
        VoteSubject::Post(_) => AppError::NotFound("Post not found".to_string()),
        VoteSubject::Comment(_) => AppError::NotFound("Comment not found".to_string()),
    }
}

// Shared by the post and comment vote endpoints
pub(crate) async fn vote_on(
    state: &AppState,
    subject: VoteSubject,
    user_id: &str,
    kind: VoteKind,
) -> Result<VoteResponse> {
    if !vote_service::subject_exists(&state.content, &subject).await? {
        return Err(not_found(&subject));
    }

    let outcome = vote_service::cast_vote(&state.content, &subject, user_id, kind).await?;
    let tally = vote_service::get_vote_tally(&state.content, &subject).await?;

    Ok(VoteResponse {
        action: outcome.action,
        user_vote: outcome.current,
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
        score: tally.net_score,
    })
}

pub(crate) async fn vote_summary(
    state: &AppState,
    subject: VoteSubject,
    viewer_id: Option<&str>,
) -> Result<VoteSummary> {
    if !vote_service::subject_exists(&state.content, &subject).await? {
        return Err(not_found(&subject));
    }

    let tally = vote_service::get_vote_tally(&state.content, &subject).await?;
    let user_vote = vote_service::get_vote_status(&state.content, &subject, viewer_id).await?;

    Ok(VoteSummary::new(tally, user_vote))
}
