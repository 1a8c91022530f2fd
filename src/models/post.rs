//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Tag;

/// Post entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Authoring user
    pub user_id: i64,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Optional header image URL
    pub image_url: Option<String>,
    /// URL slug derived from the title (unique)
    pub slug: String,
    /// Soft-delete flag
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Post enriched with like/comment counts and its tag list.
///
/// This is what list and detail endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithMeta {
    #[serde(flatten)]
    pub post: Post,
    /// Number of likes
    pub likes: i64,
    /// Number of visible comments
    pub comments: i64,
    /// Attached tags
    pub tags: Vec<Tag>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// Tag names; created on first use, deduplicated case-insensitively
    pub tags: Vec<String>,
}

/// Input for updating a post.
///
/// When `tags` is supplied the post's tag set is replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdatePostInput {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.image_url.is_none()
            && self.tags.is_none()
    }
}
