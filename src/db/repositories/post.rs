//! Post repository
//!
//! Database operations for posts, their tags, likes, and the soft-delete
//! cascade to comments. Tag rows are created inside the post transactions
//! (get-or-create by case-insensitive name), so a failed post write never
//! leaves orphan junction rows.

use crate::config::DatabaseDriver;
use crate::db::{DynDatabasePool, SqlValue, UpdateBuilder};
use crate::models::{CreatePostInput, Post, PostWithMeta, Tag, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a post with its tags in one transaction
    async fn create(&self, user_id: i64, input: &CreatePostInput, slug: &str)
        -> Result<PostWithMeta>;

    /// List all non-deleted posts with like/comment counts and tags,
    /// newest first
    async fn list_all(&self) -> Result<Vec<PostWithMeta>>;

    /// Get a post by ID with like/comment counts and tags
    async fn get_by_id(&self, id: i64) -> Result<Option<PostWithMeta>>;

    /// Whether a non-deleted post with this ID exists
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Whether any post (deleted or not) already uses this slug
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Update a post, replacing its tag set when tags are supplied.
    /// Returns false when the post is missing or not owned by the user.
    async fn update(&self, id: i64, user_id: i64, input: &UpdatePostInput) -> Result<bool>;

    /// Soft-delete a post and cascade the soft delete to its comments.
    /// Returns false when the post is missing or not owned by the user.
    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool>;

    /// Toggle a like. Returns `None` when the post is missing, otherwise
    /// `(liked, like_count)` after the toggle.
    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Option<(bool, i64)>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(
        &self,
        user_id: i64,
        input: &CreatePostInput,
        slug: &str,
    ) -> Result<PostWithMeta> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_post_sqlite(self.pool.as_sqlite().unwrap(), user_id, input, slug).await
            }
            DatabaseDriver::Mysql => {
                create_post_mysql(self.pool.as_mysql().unwrap(), user_id, input, slug).await
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_post_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let sql = "SELECT 1 FROM posts WHERE id = ? AND is_deleted = 0";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to check post existence")?;
                Ok(row.is_some())
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to check post existence")?;
                Ok(row.is_some())
            }
        }
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let sql = "SELECT 1 FROM posts WHERE slug = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(slug)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to check slug")?;
                Ok(row.is_some())
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(slug)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to check slug")?;
                Ok(row.is_some())
            }
        }
    }

    async fn update(&self, id: i64, user_id: i64, input: &UpdatePostInput) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_post_sqlite(self.pool.as_sqlite().unwrap(), id, user_id, input).await
            }
            DatabaseDriver::Mysql => {
                update_post_mysql(self.pool.as_mysql().unwrap(), id, user_id, input).await
            }
        }
    }

    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                soft_delete_post_sqlite(self.pool.as_sqlite().unwrap(), id, user_id).await
            }
            DatabaseDriver::Mysql => {
                soft_delete_post_mysql(self.pool.as_mysql().unwrap(), id, user_id).await
            }
        }
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Option<(bool, i64)>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                toggle_like_sqlite(self.pool.as_sqlite().unwrap(), post_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                toggle_like_mysql(self.pool.as_mysql().unwrap(), post_id, user_id).await
            }
        }
    }
}

const POST_META_QUERY: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.image_url, p.slug,
           p.is_deleted, p.created_at, p.updated_at,
           (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS likes,
           (SELECT COUNT(*) FROM comments c
            WHERE c.post_id = p.id AND c.is_deleted = 0) AS comments
    FROM posts p
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    input: &CreatePostInput,
    slug: &str,
) -> Result<PostWithMeta> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO posts (user_id, title, content, image_url, slug, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.image_url)
    .bind(slug)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create post")?;

    let post_id = result.last_insert_rowid();

    for name in &input.tags {
        let tag_id = get_or_create_tag_sqlite(&mut tx, name).await?;
        link_tag_sqlite(&mut tx, post_id, tag_id).await?;
    }

    tx.commit().await.context("Failed to commit")?;

    get_post_sqlite(pool, post_id)
        .await?
        .context("Post vanished after creation")
}

async fn get_or_create_tag_sqlite(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, name: &str) -> Result<i64> {
    let existing = sqlx::query("SELECT id FROM tags WHERE LOWER(name) = LOWER(?)")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to look up tag")?;

    if let Some(row) = existing {
        return Ok(row.get("id"));
    }

    let result = sqlx::query("INSERT INTO tags (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .context("Failed to create tag")?;

    Ok(result.last_insert_rowid())
}

async fn link_tag_sqlite(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    post_id: i64,
    tag_id: i64,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await
        .context("Failed to link tag")?;
    Ok(())
}

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<PostWithMeta>> {
    let sql = format!(
        "{} WHERE p.is_deleted = 0 ORDER BY p.created_at DESC, p.id DESC",
        POST_META_QUERY
    );
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    let mut tags_by_post = all_tags_by_post_sqlite(pool).await?;

    Ok(rows
        .iter()
        .map(|row| {
            let post = row_to_post_sqlite(row);
            let tags = tags_by_post.remove(&post.id).unwrap_or_default();
            PostWithMeta {
                likes: row.get("likes"),
                comments: row.get("comments"),
                tags,
                post,
            }
        })
        .collect())
}

async fn get_post_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<PostWithMeta>> {
    let sql = format!("{} WHERE p.id = ? AND p.is_deleted = 0", POST_META_QUERY);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags = tags_for_post_sqlite(pool, id).await?;
    let post = row_to_post_sqlite(&row);

    Ok(Some(PostWithMeta {
        likes: row.get("likes"),
        comments: row.get("comments"),
        tags,
        post,
    }))
}

async fn tags_for_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.created_at
        FROM tags t
        INNER JOIN post_tags pt ON pt.tag_id = t.id
        WHERE pt.post_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to get post tags")?;

    Ok(rows.iter().map(row_to_tag_sqlite).collect())
}

async fn all_tags_by_post_sqlite(pool: &SqlitePool) -> Result<HashMap<i64, Vec<Tag>>> {
    let rows = sqlx::query(
        r#"
        SELECT pt.post_id, t.id, t.name, t.created_at
        FROM post_tags pt
        INNER JOIN tags t ON t.id = pt.tag_id
        ORDER BY t.name
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to get tags")?;

    let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in &rows {
        let post_id: i64 = row.get("post_id");
        map.entry(post_id).or_default().push(row_to_tag_sqlite(row));
    }
    Ok(map)
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    input: &UpdatePostInput,
) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let owned = sqlx::query("SELECT 1 FROM posts WHERE id = ? AND user_id = ? AND is_deleted = 0")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check post ownership")?;

    if owned.is_none() {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(false);
    }

    let builder = UpdateBuilder::new("posts")
        .set_opt("title", input.title.clone().map(SqlValue::Text))
        .set_opt("content", input.content.clone().map(SqlValue::Text))
        .set_opt("image_url", input.image_url.clone().map(SqlValue::Text))
        .touch_updated_at();

    if let Some((sql, values)) = builder.build("id = ?", vec![SqlValue::Int(id)]) {
        let mut query = sqlx::query(&sql);
        for value in values {
            query = value.bind_sqlite(query);
        }
        query
            .execute(&mut *tx)
            .await
            .context("Failed to update post")?;
    }

    if let Some(tags) = &input.tags {
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post tags")?;

        for name in tags {
            let tag_id = get_or_create_tag_sqlite(&mut tx, name).await?;
            link_tag_sqlite(&mut tx, id, tag_id).await?;
        }
    }

    tx.commit().await.context("Failed to commit")?;
    Ok(true)
}

async fn soft_delete_post_sqlite(pool: &SqlitePool, id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "UPDATE posts SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND user_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete post")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE comments SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE post_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete post comments")?;

    tx.commit().await.context("Failed to commit")?;
    Ok(true)
}

async fn toggle_like_sqlite(
    pool: &SqlitePool,
    post_id: i64,
    user_id: i64,
) -> Result<Option<(bool, i64)>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let exists = sqlx::query("SELECT 1 FROM posts WHERE id = ? AND is_deleted = 0")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check post")?;

    if exists.is_none() {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(None);
    }

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to remove like")?;

    let liked = if removed.rows_affected() == 0 {
        sqlx::query("INSERT INTO post_likes (post_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .context("Failed to add like")?;
        true
    } else {
        false
    };

    let row = sqlx::query("SELECT COUNT(*) as count FROM post_likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to count likes")?;
    let count: i64 = row.get("count");

    tx.commit().await.context("Failed to commit")?;
    Ok(Some((liked, count)))
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        slug: row.get("slug"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(
    pool: &MySqlPool,
    user_id: i64,
    input: &CreatePostInput,
    slug: &str,
) -> Result<PostWithMeta> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO posts (user_id, title, content, image_url, slug, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.image_url)
    .bind(slug)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create post")?;

    let post_id = result.last_insert_id() as i64;

    for name in &input.tags {
        let tag_id = get_or_create_tag_mysql(&mut tx, name).await?;
        link_tag_mysql(&mut tx, post_id, tag_id).await?;
    }

    tx.commit().await.context("Failed to commit")?;

    get_post_mysql(pool, post_id)
        .await?
        .context("Post vanished after creation")
}

async fn get_or_create_tag_mysql(
    tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
    name: &str,
) -> Result<i64> {
    let existing = sqlx::query("SELECT id FROM tags WHERE LOWER(name) = LOWER(?)")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to look up tag")?;

    if let Some(row) = existing {
        return Ok(row.get("id"));
    }

    let result = sqlx::query("INSERT INTO tags (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .context("Failed to create tag")?;

    Ok(result.last_insert_id() as i64)
}

async fn link_tag_mysql(
    tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
    post_id: i64,
    tag_id: i64,
) -> Result<()> {
    sqlx::query("INSERT IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await
        .context("Failed to link tag")?;
    Ok(())
}

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<PostWithMeta>> {
    let sql = format!(
        "{} WHERE p.is_deleted = 0 ORDER BY p.created_at DESC, p.id DESC",
        POST_META_QUERY
    );
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    let mut tags_by_post = all_tags_by_post_mysql(pool).await?;

    Ok(rows
        .iter()
        .map(|row| {
            let post = row_to_post_mysql(row);
            let tags = tags_by_post.remove(&post.id).unwrap_or_default();
            PostWithMeta {
                likes: row.get("likes"),
                comments: row.get("comments"),
                tags,
                post,
            }
        })
        .collect())
}

async fn get_post_mysql(pool: &MySqlPool, id: i64) -> Result<Option<PostWithMeta>> {
    let sql = format!("{} WHERE p.id = ? AND p.is_deleted = 0", POST_META_QUERY);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags = tags_for_post_mysql(pool, id).await?;
    let post = row_to_post_mysql(&row);

    Ok(Some(PostWithMeta {
        likes: row.get("likes"),
        comments: row.get("comments"),
        tags,
        post,
    }))
}

async fn tags_for_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.created_at
        FROM tags t
        INNER JOIN post_tags pt ON pt.tag_id = t.id
        WHERE pt.post_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to get post tags")?;

    Ok(rows.iter().map(row_to_tag_mysql).collect())
}

async fn all_tags_by_post_mysql(pool: &MySqlPool) -> Result<HashMap<i64, Vec<Tag>>> {
    let rows = sqlx::query(
        r#"
        SELECT pt.post_id, t.id, t.name, t.created_at
        FROM post_tags pt
        INNER JOIN tags t ON t.id = pt.tag_id
        ORDER BY t.name
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to get tags")?;

    let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in &rows {
        let post_id: i64 = row.get("post_id");
        map.entry(post_id).or_default().push(row_to_tag_mysql(row));
    }
    Ok(map)
}

async fn update_post_mysql(
    pool: &MySqlPool,
    id: i64,
    user_id: i64,
    input: &UpdatePostInput,
) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let owned = sqlx::query("SELECT 1 FROM posts WHERE id = ? AND user_id = ? AND is_deleted = 0")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check post ownership")?;

    if owned.is_none() {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(false);
    }

    let builder = UpdateBuilder::new("posts")
        .set_opt("title", input.title.clone().map(SqlValue::Text))
        .set_opt("content", input.content.clone().map(SqlValue::Text))
        .set_opt("image_url", input.image_url.clone().map(SqlValue::Text))
        .touch_updated_at();

    if let Some((sql, values)) = builder.build("id = ?", vec![SqlValue::Int(id)]) {
        let mut query = sqlx::query(&sql);
        for value in values {
            query = value.bind_mysql(query);
        }
        query
            .execute(&mut *tx)
            .await
            .context("Failed to update post")?;
    }

    if let Some(tags) = &input.tags {
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post tags")?;

        for name in tags {
            let tag_id = get_or_create_tag_mysql(&mut tx, name).await?;
            link_tag_mysql(&mut tx, id, tag_id).await?;
        }
    }

    tx.commit().await.context("Failed to commit")?;
    Ok(true)
}

async fn soft_delete_post_mysql(pool: &MySqlPool, id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "UPDATE posts SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND user_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete post")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE comments SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE post_id = ? AND is_deleted = 0",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete post comments")?;

    tx.commit().await.context("Failed to commit")?;
    Ok(true)
}

async fn toggle_like_mysql(
    pool: &MySqlPool,
    post_id: i64,
    user_id: i64,
) -> Result<Option<(bool, i64)>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let exists = sqlx::query("SELECT 1 FROM posts WHERE id = ? AND is_deleted = 0")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check post")?;

    if exists.is_none() {
        tx.rollback().await.context("Failed to rollback")?;
        return Ok(None);
    }

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to remove like")?;

    let liked = if removed.rows_affected() == 0 {
        sqlx::query("INSERT INTO post_likes (post_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .context("Failed to add like")?;
        true
    } else {
        false
    };

    let row = sqlx::query("SELECT COUNT(*) as count FROM post_likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to count likes")?;
    let count: i64 = row.get("count");

    tx.commit().await.context("Failed to commit")?;
    Ok(Some((liked, count)))
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        slug: row.get("slug"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::User;

    async fn setup() -> (DynDatabasePool, SqlxPostRepository, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let alice = users
            .create(&User::new(
                "Alice".to_string(),
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let bob = users
            .create(&User::new(
                "Bob".to_string(),
                "bob".to_string(),
                "bob@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        (
            pool.clone(),
            SqlxPostRepository::new(pool),
            alice.id,
            bob.id,
        )
    }

    fn post_input(title: &str, tags: &[&str]) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: "Body text".to_string(),
            image_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_with_tags() {
        let (_pool, repo, alice, _) = setup().await;

        let created = repo
            .create(alice, &post_input("Hello", &["rust", "web"]), "hello")
            .await
            .expect("Failed to create post");

        assert!(created.post.id > 0);
        assert_eq!(created.post.slug, "hello");
        assert_eq!(created.likes, 0);
        assert_eq!(created.comments, 0);
        let names: Vec<&str> = created.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "web"]);
    }

    #[tokio::test]
    async fn test_tags_reused_across_posts() {
        let (pool, repo, alice, _) = setup().await;

        repo.create(alice, &post_input("One", &["rust"]), "one")
            .await
            .unwrap();
        repo.create(alice, &post_input("Two", &["Rust"]), "two")
            .await
            .unwrap();

        let sqlite = pool.as_sqlite().unwrap();
        let row = sqlx::query("SELECT COUNT(*) as count FROM tags")
            .fetch_one(sqlite)
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, 1, "tag lookup should be case-insensitive");
    }

    #[tokio::test]
    async fn test_list_includes_counts() {
        let (_pool, repo, alice, bob) = setup().await;

        let post = repo
            .create(alice, &post_input("Counted", &[]), "counted")
            .await
            .unwrap();
        repo.toggle_like(post.post.id, bob).await.unwrap();

        let posts = repo.list_all().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].likes, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_tags() {
        let (pool, repo, alice, _) = setup().await;

        let post = repo
            .create(alice, &post_input("Tagged", &["old", "stale"]), "tagged")
            .await
            .unwrap();

        let input = UpdatePostInput {
            tags: Some(vec!["fresh".to_string()]),
            ..Default::default()
        };
        assert!(repo.update(post.post.id, alice, &input).await.unwrap());

        let updated = repo.get_by_id(post.post.id).await.unwrap().unwrap();
        let names: Vec<&str> = updated.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["fresh"]);

        // Old tag rows survive, only junctions are replaced
        let sqlite = pool.as_sqlite().unwrap();
        let row = sqlx::query("SELECT COUNT(*) as count FROM tags")
            .fetch_one(sqlite)
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_update_not_owner() {
        let (_pool, repo, alice, bob) = setup().await;
        let post = repo
            .create(alice, &post_input("Mine", &[]), "mine")
            .await
            .unwrap();

        let input = UpdatePostInput {
            title: Some("Taken".to_string()),
            ..Default::default()
        };
        assert!(!repo.update(post.post.id, bob, &input).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_comments() {
        let (pool, repo, alice, _) = setup().await;
        let post = repo
            .create(alice, &post_input("Doomed", &[]), "doomed")
            .await
            .unwrap();

        let sqlite = pool.as_sqlite().unwrap();
        sqlx::query("INSERT INTO comments (post_id, user_id, comment) VALUES (?, ?, 'hi')")
            .bind(post.post.id)
            .bind(alice)
            .execute(sqlite)
            .await
            .unwrap();

        assert!(repo.soft_delete(post.post.id, alice).await.unwrap());

        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM comments WHERE post_id = ? AND is_deleted = 0",
        )
        .bind(post.post.id)
        .fetch_one(sqlite)
        .await
        .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, 0);

        assert!(repo.get_by_id(post.post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let (_pool, repo, alice, bob) = setup().await;
        let post = repo
            .create(alice, &post_input("Likeable", &[]), "likeable")
            .await
            .unwrap();

        let (liked, count) = repo
            .toggle_like(post.post.id, bob)
            .await
            .unwrap()
            .expect("Post should exist");
        assert!(liked);
        assert_eq!(count, 1);

        let (liked, count) = repo
            .toggle_like(post.post.id, bob)
            .await
            .unwrap()
            .expect("Post should exist");
        assert!(!liked);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_toggle_like_missing_post() {
        let (_pool, repo, _, bob) = setup().await;
        let result = repo.toggle_like(999, bob).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_slug_exists() {
        let (_pool, repo, alice, _) = setup().await;
        repo.create(alice, &post_input("Slugged", &[]), "slugged")
            .await
            .unwrap();

        assert!(repo.slug_exists("slugged").await.unwrap());
        assert!(!repo.slug_exists("slugged-2").await.unwrap());
    }
}
