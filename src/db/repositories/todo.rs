//! Todo repository
//!
//! Database operations for todos. Every read and write is scoped to the
//! owning user and filters soft-deleted rows, so a foreign or deleted id
//! behaves exactly like a missing one.

use crate::config::DatabaseDriver;
use crate::db::{DynDatabasePool, SqlValue, UpdateBuilder};
use crate::models::{CreateTodoInput, Todo, UpdateTodoInput};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Todo repository trait
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Create a todo for a user
    async fn create(&self, user_id: i64, input: &CreateTodoInput) -> Result<Todo>;

    /// List a user's todos, newest first
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Todo>>;

    /// Get a todo by ID, scoped to its owner
    async fn get_by_id(&self, id: i64, user_id: i64) -> Result<Option<Todo>>;

    /// Partially update a todo. Returns false when no row matched.
    async fn update(&self, id: i64, user_id: i64, input: &UpdateTodoInput) -> Result<bool>;

    /// Soft-delete a todo. Returns false when no row matched.
    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool>;
}

/// SQLx-based todo repository implementation
pub struct SqlxTodoRepository {
    pool: DynDatabasePool,
}

impl SqlxTodoRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TodoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TodoRepository for SqlxTodoRepository {
    async fn create(&self, user_id: i64, input: &CreateTodoInput) -> Result<Todo> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_todo_sqlite(self.pool.as_sqlite().unwrap(), user_id, input).await
            }
            DatabaseDriver::Mysql => {
                create_todo_mysql(self.pool.as_mysql().unwrap(), user_id, input).await
            }
        }
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Todo>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_todos_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                list_todos_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64, user_id: i64) -> Result<Option<Todo>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_todo_sqlite(self.pool.as_sqlite().unwrap(), id, user_id).await
            }
            DatabaseDriver::Mysql => {
                get_todo_mysql(self.pool.as_mysql().unwrap(), id, user_id).await
            }
        }
    }

    async fn update(&self, id: i64, user_id: i64, input: &UpdateTodoInput) -> Result<bool> {
        let builder = UpdateBuilder::new("todos")
            .set_opt("title", input.title.clone().map(SqlValue::Text))
            .set_opt("description", input.description.clone().map(SqlValue::Text))
            .set_opt("due_date", input.due_date.map(SqlValue::Date))
            .set_opt("status", input.status.map(|s| SqlValue::Text(s.to_string())))
            .set_opt(
                "priority",
                input.priority.map(|p| SqlValue::Text(p.to_string())),
            )
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
                    .context("Failed to update todo")?;
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
                    .context("Failed to update todo")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }

    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool> {
        let sql = "UPDATE todos SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP \
                   WHERE id = ? AND user_id = ? AND is_deleted = 0";

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let result = sqlx::query(sql)
                    .bind(id)
                    .bind(user_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete todo")?;
                Ok(result.rows_affected() > 0)
            }
            DatabaseDriver::Mysql => {
                let result = sqlx::query(sql)
                    .bind(id)
                    .bind(user_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete todo")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }
}

const TODO_COLUMNS: &str =
    "id, user_id, title, description, due_date, status, priority, is_deleted, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_todo_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    input: &CreateTodoInput,
) -> Result<Todo> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO todos (user_id, title, description, due_date, status, priority, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.due_date)
    .bind(input.status.to_string())
    .bind(input.priority.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create todo")?;

    let id = result.last_insert_rowid();

    Ok(Todo {
        id,
        user_id,
        title: input.title.clone(),
        description: input.description.clone(),
        due_date: input.due_date,
        status: input.status,
        priority: input.priority,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_todos_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Vec<Todo>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM todos WHERE user_id = ? AND is_deleted = 0 ORDER BY created_at DESC, id DESC",
        TODO_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list todos")?;

    let mut todos = Vec::new();
    for row in rows {
        todos.push(row_to_todo_sqlite(&row)?);
    }
    Ok(todos)
}

async fn get_todo_sqlite(pool: &SqlitePool, id: i64, user_id: i64) -> Result<Option<Todo>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM todos WHERE id = ? AND user_id = ? AND is_deleted = 0",
        TODO_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get todo")?;

    match row {
        Some(row) => Ok(Some(row_to_todo_sqlite(&row)?)),
        None => Ok(None),
    }
}

fn row_to_todo_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Todo> {
    let status: String = row.get("status");
    let priority: String = row.get("priority");

    Ok(Todo {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        due_date: row.get("due_date"),
        status: status.parse()?,
        priority: priority.parse()?,
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_todo_mysql(
    pool: &MySqlPool,
    user_id: i64,
    input: &CreateTodoInput,
) -> Result<Todo> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO todos (user_id, title, description, due_date, status, priority, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.due_date)
    .bind(input.status.to_string())
    .bind(input.priority.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create todo")?;

    let id = result.last_insert_id() as i64;

    Ok(Todo {
        id,
        user_id,
        title: input.title.clone(),
        description: input.description.clone(),
        due_date: input.due_date,
        status: input.status,
        priority: input.priority,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn list_todos_mysql(pool: &MySqlPool, user_id: i64) -> Result<Vec<Todo>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM todos WHERE user_id = ? AND is_deleted = 0 ORDER BY created_at DESC, id DESC",
        TODO_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list todos")?;

    let mut todos = Vec::new();
    for row in rows {
        todos.push(row_to_todo_mysql(&row)?);
    }
    Ok(todos)
}

async fn get_todo_mysql(pool: &MySqlPool, id: i64, user_id: i64) -> Result<Option<Todo>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM todos WHERE id = ? AND user_id = ? AND is_deleted = 0",
        TODO_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get todo")?;

    match row {
        Some(row) => Ok(Some(row_to_todo_mysql(&row)?)),
        None => Ok(None),
    }
}

fn row_to_todo_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Todo> {
    let status: String = row.get("status");
    let priority: String = row.get("priority");

    Ok(Todo {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        due_date: row.get("due_date"),
        status: status.parse()?,
        priority: priority.parse()?,
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{TodoPriority, TodoStatus, User};
    use chrono::NaiveDate;

    async fn setup() -> (SqlxTodoRepository, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = crate::db::repositories::SqlxUserRepository::new(pool.clone());
        let alice = users
            .create(&User::new(
                "Alice".to_string(),
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create user");
        let bob = users
            .create(&User::new(
                "Bob".to_string(),
                "bob".to_string(),
                "bob@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .expect("Failed to create user");

        (SqlxTodoRepository::new(pool), alice.id, bob.id)
    }

    fn sample_input(title: &str) -> CreateTodoInput {
        CreateTodoInput {
            title: title.to_string(),
            description: "Do the thing".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            status: TodoStatus::Pending,
            priority: TodoPriority::Medium,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, alice, _) = setup().await;

        let created = repo
            .create(alice, &sample_input("Buy milk"))
            .await
            .expect("Failed to create todo");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id, alice)
            .await
            .expect("Failed to get todo")
            .expect("Todo not found");
        assert_eq!(found.title, "Buy milk");
        assert_eq!(found.status, TodoStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_scoped_to_owner() {
        let (repo, alice, bob) = setup().await;

        let created = repo
            .create(alice, &sample_input("Private"))
            .await
            .expect("Failed to create todo");

        let found = repo
            .get_by_id(created.id, bob)
            .await
            .expect("Failed to get todo");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_excludes_deleted() {
        let (repo, alice, _) = setup().await;

        let keep = repo.create(alice, &sample_input("Keep")).await.unwrap();
        let gone = repo.create(alice, &sample_input("Gone")).await.unwrap();

        let deleted = repo
            .soft_delete(gone.id, alice)
            .await
            .expect("Failed to delete todo");
        assert!(deleted);

        let todos = repo.list_by_user(alice).await.expect("Failed to list");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (repo, alice, _) = setup().await;
        let created = repo.create(alice, &sample_input("Original")).await.unwrap();

        let input = UpdateTodoInput {
            status: Some(TodoStatus::Completed),
            ..Default::default()
        };
        let updated = repo
            .update(created.id, alice, &input)
            .await
            .expect("Failed to update todo");
        assert!(updated);

        let found = repo.get_by_id(created.id, alice).await.unwrap().unwrap();
        assert_eq!(found.status, TodoStatus::Completed);
        assert_eq!(found.title, "Original");
    }

    #[tokio::test]
    async fn test_update_other_users_todo_matches_nothing() {
        let (repo, alice, bob) = setup().await;
        let created = repo.create(alice, &sample_input("Mine")).await.unwrap();

        let input = UpdateTodoInput {
            title: Some("Stolen".to_string()),
            ..Default::default()
        };
        let updated = repo
            .update(created.id, bob, &input)
            .await
            .expect("Failed to update todo");
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_twice_second_is_noop() {
        let (repo, alice, _) = setup().await;
        let created = repo.create(alice, &sample_input("Once")).await.unwrap();

        assert!(repo.soft_delete(created.id, alice).await.unwrap());
        assert!(!repo.soft_delete(created.id, alice).await.unwrap());
    }
}
