use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{
    content::{ContentClient, Patch},
    error::{AppError, Result},
    models::{
        Block, DELETED_CONTENT, DELETED_POST_TITLE, ImageUpload, NewPost, Post, Reference, Slug,
    },
    services::{asset_service, subreddit_service},
};

static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const MAX_SLUG_LEN: usize = 96;

/// Projection for post reads. The nested subreddit has its moderator
/// dereferenced so it decodes as a full [`Subreddit`](crate::models::Subreddit).
pub(crate) const POST_PROJECTION: &str = r#"{
    _id,
    title,
    "slug": slug.current,
    body,
    publishedAt,
    "author": author->,
    "subreddit": subreddit->{..., "slug": slug.current, "moderator": moderator->},
    image,
    isDeleted,
    "votes": {
        "upvotes": count(*[_type == "vote" && post._ref == ^._id && voteType == "upvote"]),
        "downvotes": count(*[_type == "vote" && post._ref == ^._id && voteType == "downvote"])
    },
    "commentCount": count(*[_type == "comment" && post._ref == ^._id])
}"#;

/// URL slug for a post title.
pub fn slug_for_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_ALPHANUMERIC.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    let mut end = slug.len().min(MAX_SLUG_LEN);
    while !slug.is_char_boundary(end) {
        end -= 1;
    }
    let slug = slug[..end].trim_end_matches('-');

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug.to_string()
    }
}

pub async fn get_posts(content: &ContentClient) -> Result<Vec<Post>> {
    let query = format!(
        r#"*[_type == "post" && isDeleted != true] {} | order(publishedAt desc)"#,
        POST_PROJECTION
    );

    content.fetch(&query, &[]).await
}

pub async fn get_post_by_id(content: &ContentClient, post_id: &str) -> Result<Option<Post>> {
    let query = format!(
        r#"*[_type == "post" && _id == $postId][0] {}"#,
        POST_PROJECTION
    );

    content.fetch(&query, &[("postId", post_id)]).await
}

pub struct PostDraft<'a> {
    pub author_id: &'a str,
    pub subreddit_id: &'a str,
    pub title: &'a str,
    pub body: Option<&'a str>,
    pub image: Option<&'a ImageUpload>,
}

pub async fn create_post(
    content: &ContentClient,
    draft: PostDraft<'_>,
    max_image_size: usize,
) -> Result<Post> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let subreddit = subreddit_service::get_subreddit_by_id(content, draft.subreddit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    let image = match draft.image {
        Some(upload) => Some(asset_service::upload_image(content, upload, max_image_size).await?),
        None => None,
    };

    let body = draft
        .body
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .map(|body| vec![Block::paragraph(body)]);

    let document = NewPost {
        id: Uuid::new_v4().to_string(),
        doc_type: "post",
        title: title.to_string(),
        slug: Slug::new(slug_for_title(title)),
        body,
        author: Reference::to(draft.author_id),
        subreddit: Reference::to(subreddit.id.as_str()),
        image,
        published_at: Utc::now(),
    };

    let result = content.create(&document).await?;
    tracing::info!(
        "Post {} created in subreddit {} by {}",
        result.id,
        subreddit.id,
        draft.author_id
    );

    get_post_by_id(content, &result.id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Post {} missing after create", result.id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostOwnership {
    #[serde(rename = "_id")]
    id: String,
    author_id: Option<String>,
    moderator_id: Option<String>,
    image_asset_id: Option<String>,
    #[serde(default)]
    is_deleted: Option<bool>,
}

/// Soft-deletes a post. Allowed for the author and the subreddit's
/// moderator; the image asset is removed on a best-effort basis.
pub async fn delete_post(content: &ContentClient, post_id: &str, user_id: &str) -> Result<()> {
    let ownership: Option<PostOwnership> = content
        .fetch(
            r#"*[_type == "post" && _id == $postId][0] {
                _id,
                "authorId": author._ref,
                "moderatorId": subreddit->moderator._ref,
                "imageAssetId": image.asset._ref,
                isDeleted
            }"#,
            &[("postId", post_id)],
        )
        .await?;

    let post = ownership
        .filter(|post| !post.is_deleted.unwrap_or(false))
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let is_author = post.author_id.as_deref() == Some(user_id);
    let is_moderator = post.moderator_id.as_deref() == Some(user_id);
    if !is_author && !is_moderator {
        return Err(AppError::Authorization(
            "Only the author or a moderator can delete this post".to_string(),
        ));
    }

    let patch = Patch::new(post.id.as_str())
        .set("isDeleted", json!(true))
        .set("title", json!(DELETED_POST_TITLE))
        .set("body", serde_json::to_value(vec![Block::paragraph(DELETED_CONTENT)])?)
        .unset("image");
    content.patch(patch).await?;

    if let Some(asset_id) = post.image_asset_id {
        if let Err(e) = content.delete(&asset_id).await {
            tracing::error!("Error deleting image asset {}: {}", asset_id, e);
        }
    }

    tracing::info!("Post {} deleted by {}", post.id, user_id);
    Ok(())
}
