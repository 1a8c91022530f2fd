//! Todo service

use std::sync::Arc;

use thiserror::Error;

use crate::db::repositories::TodoRepository;
use crate::models::{CreateTodoInput, Todo, UpdateTodoInput};

/// Todo service errors
#[derive(Debug, Error)]
pub enum TodoServiceError {
    #[error("Todo not found")]
    NotFound,

    #[error("No valid fields to update")]
    EmptyUpdate,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Todo business logic
pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }

    pub async fn create(
        &self,
        user_id: i64,
        input: CreateTodoInput,
    ) -> Result<Todo, TodoServiceError> {
        Ok(self.todos.create(user_id, &input).await?)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Todo>, TodoServiceError> {
        Ok(self.todos.list_by_user(user_id).await?)
    }

    pub async fn get(&self, id: i64, user_id: i64) -> Result<Todo, TodoServiceError> {
        self.todos
            .get_by_id(id, user_id)
            .await?
            .ok_or(TodoServiceError::NotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        input: UpdateTodoInput,
    ) -> Result<Todo, TodoServiceError> {
        if input.is_empty() {
            return Err(TodoServiceError::EmptyUpdate);
        }

        if !self.todos.update(id, user_id, &input).await? {
            return Err(TodoServiceError::NotFound);
        }

        self.get(id, user_id).await
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<(), TodoServiceError> {
        if !self.todos.soft_delete(id, user_id).await? {
            return Err(TodoServiceError::NotFound);
        }
        Ok(())
    }
}
