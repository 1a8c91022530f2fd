//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Note entity living inside a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    #[serde(skip_serializing)]
    pub user_id: i64,
    /// Containing notebook
    #[serde(skip_serializing)]
    pub notebook_id: i64,
    /// Note title
    pub title: String,
    /// Note body (may be absent)
    pub content: Option<String>,
    /// Pinned to the top of the notebook
    pub is_pinned: bool,
    /// Soft-delete flag
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a note
#[derive(Debug, Clone)]
pub struct CreateNoteInput {
    pub title: String,
    pub content: Option<String>,
}

/// Input for updating a note.
///
/// Title is required by the API; content and is_pinned are optional.
#[derive(Debug, Clone)]
pub struct UpdateNoteInput {
    pub title: String,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
}
