use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::{
    content::ContentClient,
    error::Result,
    models::{NewUser, User},
    services::identity_service::{IdentityService, IdentityUser},
};

static SPACED_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+(.)").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const GET_USER_QUERY: &str = r#"*[_type == "user" && _id == $id][0]"#;

/// CamelCases a display name and appends a four digit suffix. Only
/// low-collision; uniqueness is not checked.
pub fn parse_username(name: &str, rng: &mut impl Rng) -> String {
    let camel = SPACED_CHAR.replace_all(name, |caps: &regex::Captures| caps[1].to_uppercase());
    let compact = WHITESPACE.replace_all(&camel, "");
    let suffix: u16 = rng.random_range(1000..=9999);

    format!("{}{}", compact, suffix)
}

fn base_name(profile: &IdentityUser) -> String {
    profile
        .full_name()
        .or_else(|| profile.username.clone())
        .or_else(|| {
            profile
                .primary_email()
                .and_then(|email| email.split('@').next())
                .map(str::to_string)
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "user".to_string())
}

pub fn new_user_from_profile(profile: &IdentityUser, rng: &mut impl Rng) -> NewUser {
    NewUser::new(
        &profile.id,
        parse_username(&base_name(profile), rng),
        profile.primary_email().unwrap_or_default().to_string(),
        profile.image_url.clone().unwrap_or_default(),
    )
}

pub async fn get_user_by_id(content: &ContentClient, user_id: &str) -> Result<Option<User>> {
    content.fetch(GET_USER_QUERY, &[("id", user_id)]).await
}

/// Writes the user with `createIfNotExists`, keyed by the identity id, so a
/// second writer for the same id leaves the first document untouched.
pub async fn add_user(content: &ContentClient, user: NewUser) -> Result<User> {
    let result = content.create_if_not_exists(&user).await?;
    if let Some(stored) = result.document_as::<User>()? {
        return Ok(stored);
    }

    // No document returned: another request may have created it first
    Ok(get_user_by_id(content, &user.id)
        .await?
        .unwrap_or_else(|| user.into()))
}

/// Returns the user document for an identity id, creating it from the
/// identity provider's profile when missing.
pub async fn ensure_user(
    content: &ContentClient,
    identity: &IdentityService,
    user_id: &str,
) -> Result<User> {
    tracing::debug!("Checking if user {} exists in content store", user_id);

    if let Some(user) = get_user_by_id(content, user_id).await? {
        tracing::debug!("User found in content store with ID: {}", user.id);
        return Ok(user);
    }

    tracing::info!("User {} not found in content store, creating new user", user_id);

    let profile = identity.get_user(user_id).await?;
    let new_user = new_user_from_profile(&profile, &mut rand::rng());
    let user = add_user(content, new_user).await?;

    tracing::info!("New user created with ID: {}", user.id);
    Ok(user)
}
