//! Comment repository
//!
//! Database operations for comments. Listings join the author so the API can
//! show who wrote each comment; edits and deletes are scoped to the author.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentAuthor, CommentWithAuthor, CreateCommentInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment on a post
    async fn create(&self, post_id: i64, user_id: i64, input: &CreateCommentInput)
        -> Result<Comment>;

    /// List a post's non-deleted comments with authors, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Update a comment's text. Returns false when no row matched.
    async fn update(&self, id: i64, user_id: i64, comment: &str) -> Result<bool>;

    /// Soft-delete a comment. Returns false when no row matched.
    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(
        &self,
        post_id: i64,
        user_id: i64,
        input: &CreateCommentInput,
    ) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_comment_sqlite(self.pool.as_sqlite().unwrap(), post_id, user_id, input)
                    .await
            }
            DatabaseDriver::Mysql => {
                create_comment_mysql(self.pool.as_mysql().unwrap(), post_id, user_id, input).await
            }
        }
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_sqlite(self.pool.as_sqlite().unwrap(), post_id).await
            }
            DatabaseDriver::Mysql => {
                list_comments_mysql(self.pool.as_mysql().unwrap(), post_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_comment_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_comment_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, id: i64, user_id: i64, comment: &str) -> Result<bool> {
        let sql = "UPDATE comments SET comment = ?, updated_at = CURRENT_TIMESTAMP \
                   WHERE id = ? AND user_id = ? AND is_deleted = 0";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let result = sqlx::query(sql)
                    .bind(comment)
                    .bind(id)
                    .bind(user_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to update comment")?;
                Ok(result.rows_affected() > 0)
            }
            DatabaseDriver::Mysql => {
                let result = sqlx::query(sql)
                    .bind(comment)
                    .bind(id)
                    .bind(user_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to update comment")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }

    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool> {
        let sql = "UPDATE comments SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
                   WHERE id = ? AND user_id = ? AND is_deleted = 0";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let result = sqlx::query(sql)
                    .bind(id)
                    .bind(user_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete comment")?;
                Ok(result.rows_affected() > 0)
            }
            DatabaseDriver::Mysql => {
                let result = sqlx::query(sql)
                    .bind(id)
                    .bind(user_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete comment")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }
}

const COMMENT_COLUMNS: &str =
    "id, post_id, user_id, parent_id, comment, is_deleted, created_at, updated_at";

const COMMENT_LIST_QUERY: &str = r#"
    SELECT c.id, c.comment, c.parent_id, c.created_at, u.id AS author_id, u.name AS author_name
    FROM comments c
    INNER JOIN users u ON u.id = c.user_id
    WHERE c.post_id = ? AND c.is_deleted = 0
    ORDER BY c.created_at ASC, c.id ASC
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(
    pool: &SqlitePool,
    post_id: i64,
    user_id: i64,
    input: &CreateCommentInput,
) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO comments (post_id, user_id, parent_id, comment, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(input.parent_id)
    .bind(&input.comment)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        post_id,
        user_id,
        parent_id: input.parent_id,
        comment: input.comment.clone(),
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_comments_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(COMMENT_LIST_QUERY)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            id: row.get("id"),
            comment: row.get("comment"),
            parent_id: row.get("parent_id"),
            created_at: row.get("created_at"),
            user: CommentAuthor {
                id: row.get("author_id"),
                name: row.get("author_name"),
            },
        })
        .collect())
}

async fn get_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM comments WHERE id = ? AND is_deleted = 0",
        COMMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment")?;

    Ok(row.as_ref().map(row_to_comment_sqlite))
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        parent_id: row.get("parent_id"),
        comment: row.get("comment"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(
    pool: &MySqlPool,
    post_id: i64,
    user_id: i64,
    input: &CreateCommentInput,
) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO comments (post_id, user_id, parent_id, comment, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(input.parent_id)
    .bind(&input.comment)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        post_id,
        user_id,
        parent_id: input.parent_id,
        comment: input.comment.clone(),
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_comments_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(COMMENT_LIST_QUERY)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            id: row.get("id"),
            comment: row.get("comment"),
            parent_id: row.get("parent_id"),
            created_at: row.get("created_at"),
            user: CommentAuthor {
                id: row.get("author_id"),
                name: row.get("author_name"),
            },
        })
        .collect())
}

async fn get_comment_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM comments WHERE id = ? AND is_deleted = 0",
        COMMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment")?;

    Ok(row.as_ref().map(row_to_comment_mysql))
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        parent_id: row.get("parent_id"),
        comment: row.get("comment"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
