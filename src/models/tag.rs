//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity attached to posts via the post_tags junction table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name (unique)
    pub name: String,
    /// Creation timestamp
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}
