pub mod asset_service;
pub mod comment_service;
pub mod identity_service;
pub mod post_service;
pub mod subreddit_service;
pub mod user_service;
pub mod vote_service;
