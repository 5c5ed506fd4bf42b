use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::{AppError, Result},
    models::{Comment, CreateCommentRequest, VoteRequest, VoteResponse, VoteSubject, VoteSummary},
    services::{
        comment_service::{self, CommentDraft},
        post_service,
    },
};

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    payload.validate()?;

    // Verify post exists and is not deleted
    let post = post_service::get_post_by_id(&state.content, &payload.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.is_deleted() {
        return Err(AppError::BadRequest(
            "Cannot comment on a deleted post".to_string(),
        ));
    }

    // If replying to a comment, verify parent comment exists
    if let Some(parent_id) = payload.parent_comment_id.as_deref() {
        let parent_comment = comment_service::get_comment_by_id(&state.content, parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

        let parent_post = parent_comment.post.as_ref().map(|post| post.id.as_str());
        if parent_post != Some(payload.post_id.as_str()) {
            return Err(AppError::BadRequest(
                "Parent comment is not on the same post".to_string(),
            ));
        }
    }

    let comment = comment_service::add_comment(
        &state.content,
        CommentDraft {
            content: &payload.content,
            post_id: &payload.post_id,
            user_id: auth_user.user_id(),
            parent_comment_id: payload.parent_comment_id.as_deref(),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<Comment>> {
    let comment = comment_service::get_comment_by_id(&state.content, &comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

pub async fn get_comment_replies(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<Value>> {
    let replies =
        comment_service::get_comment_replies(&state.content, &comment_id, auth_user.0.as_deref())
            .await?;

    Ok(Json(json!({
        "replies": replies,
        "comment_id": comment_id
    })))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    comment_service::delete_comment(&state.content, &comment_id, auth_user.user_id()).await?;

    Ok(Json(json!({
        "message": "Comment deleted successfully"
    })))
}

pub async fn vote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let response = super::vote_on(
        &state,
        VoteSubject::Comment(comment_id),
        auth_user.user_id(),
        payload.vote_type,
    )
    .await?;

    Ok(Json(response))
}

pub async fn get_comment_votes(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<VoteSummary>> {
    let summary =
        super::vote_summary(&state, VoteSubject::Comment(comment_id), auth_user.0.as_deref())
            .await?;

    Ok(Json(summary))
}
