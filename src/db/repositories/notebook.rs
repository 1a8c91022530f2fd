//! Notebook repository
//!
//! Database operations for notebooks. Deleting a notebook also soft-deletes
//! the notes inside it, in a single transaction.

use crate::config::DatabaseDriver;
use crate::db::{DynDatabasePool, SqlValue, UpdateBuilder};
use crate::models::{CreateNotebookInput, Notebook, UpdateNotebookInput};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const DEFAULT_COLOR: &str = "#fff";

/// Notebook repository trait
#[async_trait]
pub trait NotebookRepository: Send + Sync {
    /// Create a notebook for a user
    async fn create(&self, user_id: i64, input: &CreateNotebookInput) -> Result<Notebook>;

    /// List a user's notebooks, newest first
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Notebook>>;

    /// Get a notebook by ID, scoped to its owner
    async fn get_by_id(&self, id: i64, user_id: i64) -> Result<Option<Notebook>>;

    /// Partially update a notebook. Returns false when no row matched.
    async fn update(&self, id: i64, user_id: i64, input: &UpdateNotebookInput) -> Result<bool>;

    /// Soft-delete a notebook and the notes it contains.
    /// Returns false when no row matched.
    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool>;
}

/// SQLx-based notebook repository implementation
pub struct SqlxNotebookRepository {
    pool: DynDatabasePool,
}

impl SqlxNotebookRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NotebookRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NotebookRepository for SqlxNotebookRepository {
    async fn create(&self, user_id: i64, input: &CreateNotebookInput) -> Result<Notebook> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_notebook_sqlite(self.pool.as_sqlite().unwrap(), user_id, input).await
            }
            DatabaseDriver::Mysql => {
                create_notebook_mysql(self.pool.as_mysql().unwrap(), user_id, input).await
            }
        }
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Notebook>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_notebooks_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                list_notebooks_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64, user_id: i64) -> Result<Option<Notebook>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_notebook_sqlite(self.pool.as_sqlite().unwrap(), id, user_id).await
            }
            DatabaseDriver::Mysql => {
                get_notebook_mysql(self.pool.as_mysql().unwrap(), id, user_id).await
            }
        }
    }

    async fn update(&self, id: i64, user_id: i64, input: &UpdateNotebookInput) -> Result<bool> {
        let builder = UpdateBuilder::new("notebooks")
            .set_opt("title", input.title.clone().map(SqlValue::Text))
            .set_opt("description", input.description.clone().map(SqlValue::Text))
            .set_opt("color", input.color.clone().map(SqlValue::Text))
            .touch_updated_at();

        let (sql, values) = builder
            .build(
                "id = ? AND user_id = ? AND is_deleted = 0",
                vec![SqlValue::Int(id), SqlValue::Int(user_id)],
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
                    .context("Failed to update notebook")?;
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
                    .context("Failed to update notebook")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }

    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                soft_delete_notebook_sqlite(self.pool.as_sqlite().unwrap(), id, user_id).await
            }
            DatabaseDriver::Mysql => {
                soft_delete_notebook_mysql(self.pool.as_mysql().unwrap(), id, user_id).await
            }
        }
    }
}

const NOTEBOOK_COLUMNS: &str =
    "id, user_id, title, description, color, is_deleted, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_notebook_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    input: &CreateNotebookInput,
) -> Result<Notebook> {
    let now = Utc::now();
    let description = input.description.clone().unwrap_or_default();
    let color = input
        .color
        .clone()
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    let result = sqlx::query(
        r#"
        INSERT INTO notebooks (user_id, title, description, color, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&description)
    .bind(&color)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create notebook")?;

    Ok(Notebook {
        id: result.last_insert_rowid(),
        user_id,
        title: input.title.clone(),
        description,
        color,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_notebooks_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Vec<Notebook>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM notebooks WHERE user_id = ? AND is_deleted = 0 ORDER BY created_at DESC, id DESC",
        NOTEBOOK_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notebooks")?;

    Ok(rows.iter().map(row_to_notebook_sqlite).collect())
}

async fn get_notebook_sqlite(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<Option<Notebook>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM notebooks WHERE id = ? AND user_id = ? AND is_deleted = 0",
        NOTEBOOK_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get notebook")?;

    Ok(row.as_ref().map(row_to_notebook_sqlite))
}

async fn soft_delete_notebook_sqlite(pool: &SqlitePool, id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "UPDATE notebooks SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND user_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete notebook")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE notes SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE notebook_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete notebook notes")?;

    tx.commit().await.context("Failed to commit")?;
    Ok(true)
}

fn row_to_notebook_sqlite(row: &sqlx::sqlite::SqliteRow) -> Notebook {
    Notebook {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        color: row.get("color"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_notebook_mysql(
    pool: &MySqlPool,
    user_id: i64,
    input: &CreateNotebookInput,
) -> Result<Notebook> {
    let now = Utc::now();
    let description = input.description.clone().unwrap_or_default();
    let color = input
        .color
        .clone()
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    let result = sqlx::query(
        r#"
        INSERT INTO notebooks (user_id, title, description, color, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&description)
    .bind(&color)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create notebook")?;

    Ok(Notebook {
        id: result.last_insert_id() as i64,
        user_id,
        title: input.title.clone(),
        description,
        color,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_notebooks_mysql(pool: &MySqlPool, user_id: i64) -> Result<Vec<Notebook>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM notebooks WHERE user_id = ? AND is_deleted = 0 ORDER BY created_at DESC, id DESC",
        NOTEBOOK_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notebooks")?;

    Ok(rows.iter().map(row_to_notebook_mysql).collect())
}

async fn get_notebook_mysql(pool: &MySqlPool, id: i64, user_id: i64) -> Result<Option<Notebook>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM notebooks WHERE id = ? AND user_id = ? AND is_deleted = 0",
        NOTEBOOK_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get notebook")?;

    Ok(row.as_ref().map(row_to_notebook_mysql))
}

async fn soft_delete_notebook_mysql(pool: &MySqlPool, id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "UPDATE notebooks SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND user_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete notebook")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE notes SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE notebook_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete notebook notes")?;

    tx.commit().await.context("Failed to commit")?;
    Ok(true)
}

fn row_to_notebook_mysql(row: &sqlx::mysql::MySqlRow) -> Notebook {
    Notebook {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        color: row.get("color"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
