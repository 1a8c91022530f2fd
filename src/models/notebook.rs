//! Notebook model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notebook entity grouping a user's notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Notebook title
    pub title: String,
    /// Optional description (empty string when unset)
    pub description: String,
    /// Display color, e.g. "#fff"
    pub color: String,
    /// Soft-delete flag
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a notebook
#[derive(Debug, Clone)]
pub struct CreateNotebookInput {
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Input for partially updating a notebook
#[derive(Debug, Clone, Default)]
pub struct UpdateNotebookInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl UpdateNotebookInput {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.color.is_none()
    }
}
