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
    models::{CreatePostRequest, Post, VoteRequest, VoteResponse, VoteSubject, VoteSummary},
    services::{
        comment_service,
        post_service::{self, PostDraft},
    },
};

pub async fn get_posts(State(state): State<AppState>) -> Result<Json<Value>> {
    let posts = post_service::get_posts(&state.content).await?;

    Ok(Json(json!({
        "posts": posts
    })))
}

pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    payload.validate()?;

    let post = post_service::create_post(
        &state.content,
        PostDraft {
            author_id: auth_user.user_id(),
            subreddit_id: &payload.subreddit_id,
            title: &payload.title,
            body: payload.body.as_deref(),
            image: payload.image.as_ref(),
        },
        state.config.max_image_size,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    let post = post_service::get_post_by_id(&state.content, &post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    post_service::delete_post(&state.content, &post_id, auth_user.user_id()).await?;

    Ok(Json(json!({
        "message": "Post deleted successfully"
    })))
}

pub async fn vote_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let response = super::vote_on(
        &state,
        VoteSubject::Post(post_id),
        auth_user.user_id(),
        payload.vote_type,
    )
    .await?;

    Ok(Json(response))
}

pub async fn get_post_votes(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<VoteSummary>> {
    let summary =
        super::vote_summary(&state, VoteSubject::Post(post_id), auth_user.0.as_deref()).await?;

    Ok(Json(summary))
}

pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<Value>> {
    // Verify post exists
    let _post = post_service::get_post_by_id(&state.content, &post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments =
        comment_service::get_post_comments(&state.content, &post_id, auth_user.0.as_deref())
            .await?;

    Ok(Json(json!({
        "comments": comments,
        "post_id": post_id
    })))
}
