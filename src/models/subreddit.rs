use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{ImageRef, ImageUpload, Reference, Slug, User};

/// Subreddit as returned by read queries: slug flattened to its current
/// value and the moderator dereferenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subreddit {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub moderator: Option<User>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Subreddit document as written on creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubreddit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub title: String,
    pub description: String,
    pub slug: Slug,
    pub moderator: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
}

impl NewSubreddit {
    /// Flattens the written document into the read shape, with the
    /// moderator left undereferenced.
    pub fn into_subreddit(self) -> Subreddit {
        Subreddit {
            id: self.id,
            title: self.title,
            slug: Some(self.slug.current),
            description: Some(self.description),
            image: self.image,
            moderator: None,
            created_at: Some(self.created_at),
        }
    }
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    // Lowercase letters, digits and single hyphens, no leading or trailing hyphen
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--");

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_slug").with_message(
            "Slug may only contain lowercase letters, numbers and single hyphens".into(),
        ))
    }
}

// Create subreddit request
#[derive(Debug, Validate, Deserialize)]
pub struct CreateSubredditRequest {
    #[validate(length(min = 3, max = 50))]
    #[serde(deserialize_with = "crate::models::trimmed")]
    pub name: String,
    #[validate(length(min = 3, max = 50), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(nested)]
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Deserialize)]
pub struct SearchSubredditsQuery {
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, slug: Option<&str>) -> CreateSubredditRequest {
        CreateSubredditRequest {
            name: name.to_string(),
            slug: slug.map(str::to_string),
            description: None,
            image: None,
        }
    }

    #[test]
    fn accepts_plain_names_and_slugs() {
        assert!(request("Rust Programming", None).validate().is_ok());
        assert!(request("rustaceans", Some("rust-lang-2")).validate().is_ok());
    }

    #[test]
    fn rejects_short_names_and_bad_slugs() {
        assert!(request("rs", None).validate().is_err());
        assert!(request("rustaceans", Some("Rust Lang")).validate().is_err());
        assert!(request("rustaceans", Some("-rust")).validate().is_err());
        assert!(request("rustaceans", Some("rust--lang")).validate().is_err());
    }

    #[test]
    fn padded_short_name_is_rejected() {
        let request: CreateSubredditRequest =
            serde_json::from_value(serde_json::json!({"name": "  ab  "})).unwrap();

        assert_eq!(request.name, "ab");
        assert!(request.validate().is_err());
    }
}
