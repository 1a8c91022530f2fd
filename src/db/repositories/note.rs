//! Note repository
//!
//! Database operations for notes. Notes are addressed through their notebook,
//! so every query is scoped to both the notebook and the owning user.

use crate::config::DatabaseDriver;
use crate::db::{DynDatabasePool, SqlValue, UpdateBuilder};
use crate::models::{CreateNoteInput, Note, UpdateNoteInput};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Note repository trait
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a note inside a notebook
    async fn create(&self, user_id: i64, notebook_id: i64, input: &CreateNoteInput)
        -> Result<Note>;

    /// List a notebook's notes, pinned first then newest
    async fn list_by_notebook(&self, notebook_id: i64, user_id: i64) -> Result<Vec<Note>>;

    /// Get a note by ID, scoped to its notebook and owner
    async fn get_by_id(&self, id: i64, notebook_id: i64, user_id: i64) -> Result<Option<Note>>;

    /// Update a note. Returns false when no row matched.
    async fn update(
        &self,
        id: i64,
        notebook_id: i64,
        user_id: i64,
        input: &UpdateNoteInput,
    ) -> Result<bool>;

    /// Soft-delete a note. Returns false when no row matched.
    async fn soft_delete(&self, id: i64, notebook_id: i64, user_id: i64) -> Result<bool>;
}

/// SQLx-based note repository implementation
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(
        &self,
        user_id: i64,
        notebook_id: i64,
        input: &CreateNoteInput,
    ) -> Result<Note> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_note_sqlite(self.pool.as_sqlite().unwrap(), user_id, notebook_id, input)
                    .await
            }
            DatabaseDriver::Mysql => {
                create_note_mysql(self.pool.as_mysql().unwrap(), user_id, notebook_id, input).await
            }
        }
    }

    async fn list_by_notebook(&self, notebook_id: i64, user_id: i64) -> Result<Vec<Note>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_notes_sqlite(self.pool.as_sqlite().unwrap(), notebook_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                list_notes_mysql(self.pool.as_mysql().unwrap(), notebook_id, user_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64, notebook_id: i64, user_id: i64) -> Result<Option<Note>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_note_sqlite(self.pool.as_sqlite().unwrap(), id, notebook_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                get_note_mysql(self.pool.as_mysql().unwrap(), id, notebook_id, user_id).await
            }
        }
    }

    async fn update(
        &self,
        id: i64,
        notebook_id: i64,
        user_id: i64,
        input: &UpdateNoteInput,
    ) -> Result<bool> {
        let builder = UpdateBuilder::new("notes")
            .set("title", SqlValue::Text(input.title.clone()))
            .set_opt("content", input.content.clone().map(SqlValue::Text))
            .set_opt("is_pinned", input.is_pinned.map(SqlValue::Bool))
            .touch_updated_at();

        let (sql, values) = builder
            .build(
                "id = ? AND notebook_id = ? AND user_id = ? AND is_deleted = 0",
                vec![
                    SqlValue::Int(id),
                    SqlValue::Int(notebook_id),
                    SqlValue::Int(user_id),
                ],
            )
            .ok_or_else(|| anyhow!("No fields to update"))?;

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                for value in values {
                    query = value.bind_sqlite(query);
                }
                let result = query
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to update note")?;
                Ok(result.rows_affected() > 0)
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                for value in values {
                    query = value.bind_mysql(query);
                }
                let result = query
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to update note")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }

    async fn soft_delete(&self, id: i64, notebook_id: i64, user_id: i64) -> Result<bool> {
        let sql = "UPDATE notes SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
                   WHERE id = ? AND notebook_id = ? AND user_id = ? AND is_deleted = 0";

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let result = sqlx::query(sql)
                    .bind(id)
                    .bind(notebook_id)
                    .bind(user_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete note")?;
                Ok(result.rows_affected() > 0)
            }
            DatabaseDriver::Mysql => {
                let result = sqlx::query(sql)
                    .bind(id)
                    .bind(notebook_id)
                    .bind(user_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete note")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }
}

const NOTE_COLUMNS: &str =
    "id, user_id, notebook_id, title, content, is_pinned, is_deleted, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_note_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    notebook_id: i64,
    input: &CreateNoteInput,
) -> Result<Note> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO notes (user_id, notebook_id, title, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(notebook_id)
    .bind(&input.title)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create note")?;

    Ok(Note {
        id: result.last_insert_rowid(),
        user_id,
        notebook_id,
        title: input.title.clone(),
        content: input.content.clone(),
        is_pinned: false,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_notes_sqlite(
    pool: &SqlitePool,
    notebook_id: i64,
    user_id: i64,
) -> Result<Vec<Note>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM notes WHERE notebook_id = ? AND user_id = ? AND is_deleted = 0 \
         ORDER BY is_pinned DESC, created_at DESC, id DESC",
        NOTE_COLUMNS
    ))
    .bind(notebook_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notes")?;

    Ok(rows.iter().map(row_to_note_sqlite).collect())
}

async fn get_note_sqlite(
    pool: &SqlitePool,
    id: i64,
    notebook_id: i64,
    user_id: i64,
) -> Result<Option<Note>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM notes WHERE id = ? AND notebook_id = ? AND user_id = ? AND is_deleted = 0",
        NOTE_COLUMNS
    ))
    .bind(id)
    .bind(notebook_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get note")?;

    Ok(row.as_ref().map(row_to_note_sqlite))
}

fn row_to_note_sqlite(row: &sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        notebook_id: row.get("notebook_id"),
        title: row.get("title"),
        content: row.get("content"),
        is_pinned: row.get("is_pinned"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_note_mysql(
    pool: &MySqlPool,
    user_id: i64,
    notebook_id: i64,
    input: &CreateNoteInput,
) -> Result<Note> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO notes (user_id, notebook_id, title, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(notebook_id)
    .bind(&input.title)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create note")?;

    Ok(Note {
        id: result.last_insert_id() as i64,
        user_id,
        notebook_id,
        title: input.title.clone(),
        content: input.content.clone(),
        is_pinned: false,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_notes_mysql(pool: &MySqlPool, notebook_id: i64, user_id: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM notes WHERE notebook_id = ? AND user_id = ? AND is_deleted = 0 \
         ORDER BY is_pinned DESC, created_at DESC, id DESC",
        NOTE_COLUMNS
    ))
    .bind(notebook_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notes")?;

    Ok(rows.iter().map(row_to_note_mysql).collect())
}

async fn get_note_mysql(
    pool: &MySqlPool,
    id: i64,
    notebook_id: i64,
    user_id: i64,
) -> Result<Option<Note>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM notes WHERE id = ? AND notebook_id = ? AND user_id = ? AND is_deleted = 0",
        NOTE_COLUMNS
    ))
    .bind(id)
    .bind(notebook_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get note")?;

    Ok(row.as_ref().map(row_to_note_mysql))
}

fn row_to_note_mysql(row: &sqlx::mysql::MySqlRow) -> Note {
    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        notebook_id: row.get("notebook_id"),
        title: row.get("title"),
        content: row.get("content"),
        is_pinned: row.get("is_pinned"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        NotebookRepository, SqlxNotebookRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateNotebookInput, User};

    async fn setup() -> (SqlxNoteRepository, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "Alice".to_string(),
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create user");

        let notebooks = SqlxNotebookRepository::new(pool.clone());
        let notebook = notebooks
            .create(
                user.id,
                &CreateNotebookInput {
                    title: "Journal".to_string(),
                    description: None,
                    color: None,
                },
            )
            .await
            .expect("Failed to create notebook");

        (SqlxNoteRepository::new(pool), user.id, notebook.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, user_id, notebook_id) = setup().await;

        let created = repo
            .create(
                user_id,
                notebook_id,
                &CreateNoteInput {
                    title: "Day one".to_string(),
                    content: Some("It rained.".to_string()),
                },
            )
            .await
            .expect("Failed to create note");

        let found = repo
            .get_by_id(created.id, notebook_id, user_id)
            .await
            .unwrap()
            .expect("Note not found");
        assert_eq!(found.title, "Day one");
        assert!(!found.is_pinned);
    }

    #[tokio::test]
    async fn test_pinned_notes_listed_first() {
        let (repo, user_id, notebook_id) = setup().await;

        let plain = repo
            .create(
                user_id,
                notebook_id,
                &CreateNoteInput {
                    title: "Plain".to_string(),
                    content: None,
                },
            )
            .await
            .unwrap();
        let pinned = repo
            .create(
                user_id,
                notebook_id,
                &CreateNoteInput {
                    title: "Pinned".to_string(),
                    content: None,
                },
            )
            .await
            .unwrap();

        repo.update(
            pinned.id,
            notebook_id,
            user_id,
            &UpdateNoteInput {
                title: "Pinned".to_string(),
                content: None,
                is_pinned: Some(true),
            },
        )
        .await
        .unwrap();

        let notes = repo.list_by_notebook(notebook_id, user_id).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, pinned.id);
        assert_eq!(notes[1].id, plain.id);
    }

    #[tokio::test]
    async fn test_note_scoped_to_notebook() {
        let (repo, user_id, notebook_id) = setup().await;

        let created = repo
            .create(
                user_id,
                notebook_id,
                &CreateNoteInput {
                    title: "Scoped".to_string(),
                    content: None,
                },
            )
            .await
            .unwrap();

        // Wrong notebook id behaves like a missing note
        let found = repo
            .get_by_id(created.id, notebook_id + 1, user_id)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_note() {
        let (repo, user_id, notebook_id) = setup().await;

        let created = repo
            .create(
                user_id,
                notebook_id,
                &CreateNoteInput {
                    title: "Gone".to_string(),
                    content: None,
                },
            )
            .await
            .unwrap();

        assert!(repo
            .soft_delete(created.id, notebook_id, user_id)
            .await
            .unwrap());
        assert!(repo
            .get_by_id(created.id, notebook_id, user_id)
            .await
            .unwrap()
            .is_none());
    }
}
