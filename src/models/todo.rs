//! Todo model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Todo entity owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Due date
    pub due_date: NaiveDate,
    /// Current status
    pub status: TodoStatus,
    /// Priority level
    pub priority: TodoPriority,
    /// Soft-delete flag
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Todo status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not started yet (default)
    #[default]
    Pending,
    /// Work in progress
    InProgress,
    /// Done
    Completed,
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoStatus::Pending => write!(f, "pending"),
            TodoStatus::InProgress => write!(f, "in_progress"),
            TodoStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TodoStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TodoStatus::Pending),
            "in_progress" => Ok(TodoStatus::InProgress),
            "completed" => Ok(TodoStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid todo status: {}", s)),
        }
    }
}

/// Todo priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoPriority::Low => write!(f, "low"),
            TodoPriority::Medium => write!(f, "medium"),
            TodoPriority::High => write!(f, "high"),
        }
    }
}

impl FromStr for TodoPriority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TodoPriority::Low),
            "medium" => Ok(TodoPriority::Medium),
            "high" => Ok(TodoPriority::High),
            _ => Err(anyhow::anyhow!("Invalid todo priority: {}", s)),
        }
    }
}

/// Input for creating a new todo
#[derive(Debug, Clone)]
pub struct CreateTodoInput {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TodoStatus,
    pub priority: TodoPriority,
}

/// Input for partially updating a todo.
///
/// Only the supplied fields end up in the UPDATE statement.
#[derive(Debug, Clone, Default)]
pub struct UpdateTodoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
}

impl UpdateTodoInput {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}
