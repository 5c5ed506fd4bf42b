pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::SessionVerifier, config::Config, content::ContentClient,
    services::identity_service::IdentityService,
};

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentClient>,
    pub identity: Arc<IdentityService>,
    pub sessions: Arc<SessionVerifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn from_config(config: Config) -> error::Result<Self> {
        Ok(Self {
            content: Arc::new(ContentClient::from_config(&config)?),
            identity: Arc::new(IdentityService::from_config(&config)?),
            sessions: Arc::new(SessionVerifier::new(&config.clerk_jwt_key)?),
            config: Arc::new(config),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid allowed origin: {}", origin);
                        None
                    }
                })
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let api = Router::new()
        // User routes
        .route("/api/users/me", get(handlers::users::get_current_user))
        // Subreddit routes
        .route(
            "/api/subreddits",
            get(handlers::subreddits::get_subreddits).post(handlers::subreddits::create_subreddit),
        )
        .route(
            "/api/subreddits/search",
            get(handlers::subreddits::search_subreddits),
        )
        .route(
            "/api/subreddits/{slug}",
            get(handlers::subreddits::get_subreddit),
        )
        .route(
            "/api/subreddits/{slug}/posts",
            get(handlers::subreddits::get_subreddit_posts),
        )
        // Post routes
        .route(
            "/api/posts",
            get(handlers::posts::get_posts).post(handlers::posts::create_post),
        )
        .route(
            "/api/posts/{post_id}",
            get(handlers::posts::get_post).delete(handlers::posts::delete_post),
        )
        .route("/api/posts/{post_id}/vote", post(handlers::posts::vote_post))
        .route(
            "/api/posts/{post_id}/votes",
            get(handlers::posts::get_post_votes),
        )
        .route(
            "/api/posts/{post_id}/comments",
            get(handlers::posts::get_post_comments),
        )
        // Comment routes
        .route("/api/comments", post(handlers::comments::create_comment))
        .route(
            "/api/comments/{comment_id}",
            get(handlers::comments::get_comment).delete(handlers::comments::delete_comment),
        )
        .route(
            "/api/comments/{comment_id}/replies",
            get(handlers::comments::get_comment_replies),
        )
        .route(
            "/api/comments/{comment_id}/vote",
            post(handlers::comments::vote_comment),
        )
        .route(
            "/api/comments/{comment_id}/votes",
            get(handlers::comments::get_comment_votes),
        );

    api.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
    .with_state(state)
}
