//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity. Threads are formed via the self-referencing parent_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Commented post
    pub post_id: i64,
    /// Authoring user
    pub user_id: i64,
    /// Parent comment for threaded replies
    pub parent_id: Option<i64>,
    /// Comment text
    pub comment: String,
    /// Soft-delete flag
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Author info embedded in comment listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: i64,
    pub name: String,
}

/// Comment joined with its author, as returned by the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub comment: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub user: CommentAuthor,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub comment: String,
    pub parent_id: Option<i64>,
}
