//! Post service
//!
//! Slug generation with uniqueness probing, case-insensitive tag
//! deduplication, and the post CRUD plus like toggle.

use std::sync::Arc;

use thiserror::Error;

use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, PostWithMeta, UpdatePostInput};

/// Post service errors
#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error("Post not found")]
    NotFound,

    #[error("No valid fields to update")]
    EmptyUpdate,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Post business logic
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn create(
        &self,
        user_id: i64,
        mut input: CreatePostInput,
    ) -> Result<PostWithMeta, PostServiceError> {
        input.tags = dedup_tags(input.tags);
        let slug = self.unique_slug(&input.title).await?;
        Ok(self.posts.create(user_id, &input, &slug).await?)
    }

    pub async fn list(&self) -> Result<Vec<PostWithMeta>, PostServiceError> {
        Ok(self.posts.list_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<PostWithMeta, PostServiceError> {
        self.posts
            .get_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        mut input: UpdatePostInput,
    ) -> Result<PostWithMeta, PostServiceError> {
        if input.is_empty() {
            return Err(PostServiceError::EmptyUpdate);
        }
        if let Some(tags) = input.tags.take() {
            input.tags = Some(dedup_tags(tags));
        }

        if !self.posts.update(id, user_id, &input).await? {
            return Err(PostServiceError::NotFound);
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<(), PostServiceError> {
        if !self.posts.soft_delete(id, user_id).await? {
            return Err(PostServiceError::NotFound);
        }
        Ok(())
    }

    /// Toggle the caller's like. Returns `(liked, like_count)`.
    pub async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<(bool, i64), PostServiceError> {
        self.posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    /// Derive a slug from the title, probing `-2`, `-3`, ... on collision.
    async fn unique_slug(&self, title: &str) -> Result<String, PostServiceError> {
        let base = generate_slug(title);
        let base = if base.is_empty() {
            "post".to_string()
        } else {
            base
        };

        if !self.posts.slug_exists(&base).await? {
            return Ok(base);
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.posts.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Generate a URL-friendly slug from a title.
///
/// Lowercases, keeps ASCII alphanumerics, turns separators into single
/// hyphens, and preserves non-ASCII characters as-is.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::new();
    let mut last_was_hyphen = true;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_hyphen = false;
        } else if c == ' ' || c == '-' || c == '_' {
            if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        } else if !c.is_ascii() {
            slug.push(c);
            last_was_hyphen = false;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Trim tag names and drop duplicates case-insensitively, keeping the
/// first-seen casing.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    let mut result = Vec::new();

    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
            result.push(trimmed.to_string());
        }
    }

    result
}
