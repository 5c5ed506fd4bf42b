pub mod comment;
pub mod document;
pub mod media;
pub mod post;
pub mod subreddit;
pub mod user;
pub mod vote;

pub use comment::*;
pub use document::*;
pub use media::*;
pub use post::*;
pub use subreddit::*;
pub use user::*;
pub use vote::*;

use serde::{Deserialize, Deserializer};

/// Request strings are trimmed on the way in, so length checks see what is stored.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}
