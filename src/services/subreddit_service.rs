use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{
    content::ContentClient,
    error::{AppError, Result},
    models::{ImageUpload, NewSubreddit, Post, Reference, Slug, Subreddit},
    services::{asset_service, post_service},
};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const SUBREDDIT_PROJECTION: &str = r#"{
    ...,
    "slug": slug.current,
    "moderator": moderator->
}"#;

/// Default slug: lower-cased name with whitespace runs turned into hyphens.
pub fn slug_for_name(name: &str) -> String {
    WHITESPACE
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

pub async fn get_subreddits(content: &ContentClient) -> Result<Vec<Subreddit>> {
    let query = format!(
        r#"*[_type == "subreddit"] {} | order(createdAt desc)"#,
        SUBREDDIT_PROJECTION
    );

    content.fetch(&query, &[]).await
}

pub async fn get_subreddit_by_slug(content: &ContentClient, slug: &str) -> Result<Option<Subreddit>> {
    let query = format!(
        r#"*[_type == "subreddit" && slug.current == $slug][0] {}"#,
        SUBREDDIT_PROJECTION
    );

    content
        .fetch(&query, &[("slug", slug.to_lowercase().as_str())])
        .await
}

pub async fn get_subreddit_by_id(content: &ContentClient, id: &str) -> Result<Option<Subreddit>> {
    let query = format!(
        r#"*[_type == "subreddit" && _id == $id][0] {}"#,
        SUBREDDIT_PROJECTION
    );

    content.fetch(&query, &[("id", id)]).await
}

/// Prefix search on titles. A blank term matches nothing.
pub async fn search_subreddits(content: &ContentClient, term: &str) -> Result<Vec<Subreddit>> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(Vec::new());
    }

    let query = r#"*[_type == "subreddit" && title match $searchTerm + "*"] {
        _id,
        title,
        "slug": slug.current,
        description,
        image,
        "moderator": moderator->,
        createdAt
    } | order(createdAt desc)"#;

    content
        .fetch(query, &[("searchTerm", term.to_lowercase().as_str())])
        .await
}

async fn title_taken(content: &ContentClient, name: &str) -> Result<bool> {
    let found: Option<String> = content
        .fetch(
            r#"*[_type == "subreddit" && title == $name][0]._id"#,
            &[("name", name)],
        )
        .await?;
    Ok(found.is_some())
}

async fn slug_taken(content: &ContentClient, slug: &str) -> Result<bool> {
    let found: Option<String> = content
        .fetch(
            r#"*[_type == "subreddit" && slug.current == $slug][0]._id"#,
            &[("slug", slug)],
        )
        .await?;
    Ok(found.is_some())
}

pub struct SubredditDraft<'a> {
    pub name: &'a str,
    pub moderator_id: &'a str,
    pub image: Option<&'a ImageUpload>,
    pub slug: Option<&'a str>,
    pub description: Option<&'a str>,
}

pub async fn create_subreddit(
    content: &ContentClient,
    draft: SubredditDraft<'_>,
    max_image_size: usize,
) -> Result<Subreddit> {
    let name = draft.name.trim();
    tracing::info!(
        "Creating subreddit: {} with moderator: {}",
        name,
        draft.moderator_id
    );

    if title_taken(content, name).await? {
        tracing::info!("Subreddit \"{}\" already exists", name);
        return Err(AppError::Conflict(
            "A subreddit with this name already exists".to_string(),
        ));
    }

    if let Some(custom) = draft.slug {
        if slug_taken(content, custom).await? {
            tracing::info!("Subreddit with slug \"{}\" already exists", custom);
            return Err(AppError::Conflict(
                "A subreddit with this URL already exists".to_string(),
            ));
        }
    }

    let slug = draft
        .slug
        .map(str::to_string)
        .unwrap_or_else(|| slug_for_name(name));

    // A failed upload does not block creation
    let image = match draft.image {
        Some(upload) => match asset_service::upload_image(content, upload, max_image_size).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::error!("Error uploading subreddit image: {}", e);
                None
            }
        },
        None => None,
    };

    let document = NewSubreddit {
        id: Uuid::new_v4().to_string(),
        doc_type: "subreddit",
        title: name.to_string(),
        description: draft
            .description
            .map(str::to_string)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Welcome to r/{}", name)),
        slug: Slug::new(slug),
        moderator: Reference::to(draft.moderator_id),
        image,
        created_at: Utc::now(),
    };

    let result = content.create(&document).await?;
    tracing::info!("Subreddit created successfully with ID: {}", result.id);

    Ok(document.into_subreddit())
}

pub async fn get_posts_for_subreddit(content: &ContentClient, subreddit_id: &str) -> Result<Vec<Post>> {
    let query = format!(
        r#"*[_type == "post" && subreddit._ref == $id && isDeleted != true] {} | order(publishedAt desc)"#,
        post_service::POST_PROJECTION
    );

    content.fetch(&query, &[("id", subreddit_id)]).await
}
