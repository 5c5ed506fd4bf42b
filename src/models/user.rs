use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User document. Its `_id` is the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

/// User document as written on first sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub joined_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(id: &str, username: String, email: String, image_url: String) -> Self {
        Self {
            id: id.to_string(),
            doc_type: "user",
            username,
            email,
            image_url,
            joined_at: Utc::now(),
        }
    }
}

impl From<NewUser> for User {
    fn from(user: NewUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: Some(user.email),
            image_url: Some(user.image_url),
            joined_at: Some(user.joined_at),
        }
    }
}

// User response (public view)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image_url: user.image_url,
            joined_at: user.joined_at,
        }
    }
}
