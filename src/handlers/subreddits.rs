use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CreateSubredditRequest, SearchSubredditsQuery, Subreddit},
    services::subreddit_service::{self, SubredditDraft},
};

pub async fn get_subreddits(State(state): State<AppState>) -> Result<Json<Value>> {
    let subreddits = subreddit_service::get_subreddits(&state.content).await?;

    Ok(Json(json!({
        "subreddits": subreddits
    })))
}

pub async fn create_subreddit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateSubredditRequest>,
) -> Result<(StatusCode, Json<Subreddit>)> {
    payload.validate()?;

    let subreddit = subreddit_service::create_subreddit(
        &state.content,
        SubredditDraft {
            name: &payload.name,
            moderator_id: auth_user.user_id(),
            image: payload.image.as_ref(),
            slug: payload.slug.as_deref(),
            description: payload.description.as_deref(),
        },
        state.config.max_image_size,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(subreddit)))
}

pub async fn search_subreddits(
    State(state): State<AppState>,
    Query(params): Query<SearchSubredditsQuery>,
) -> Result<Json<Value>> {
    let term = params.q.unwrap_or_default();
    let results = subreddit_service::search_subreddits(&state.content, &term).await?;

    Ok(Json(json!({
        "query": term,
        "subreddits": results
    })))
}

pub async fn get_subreddit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Subreddit>> {
    let subreddit = subreddit_service::get_subreddit_by_slug(&state.content, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    Ok(Json(subreddit))
}

pub async fn get_subreddit_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let subreddit = subreddit_service::get_subreddit_by_slug(&state.content, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    let posts = subreddit_service::get_posts_for_subreddit(&state.content, &subreddit.id).await?;

    Ok(Json(json!({
        "subreddit": subreddit,
        "posts": posts
    })))
}
