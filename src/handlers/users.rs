use axum::response::Json;

use crate::{auth::AuthUser, error::Result, models::UserResponse};

/// Current user. The extractor provisions the user document on first call.
pub async fn get_current_user(auth_user: AuthUser) -> Result<Json<UserResponse>> {
    Ok(Json(auth_user.user.into()))
}
