//! Notebook service

use std::sync::Arc;

use thiserror::Error;

use crate::db::repositories::NotebookRepository;
use crate::models::{CreateNotebookInput, Notebook, UpdateNotebookInput};

/// Notebook service errors
#[derive(Debug, Error)]
pub enum NotebookServiceError {
    #[error("Notebook not found")]
    NotFound,

    #[error("No valid fields to update")]
    EmptyUpdate,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Notebook business logic
pub struct NotebookService {
    notebooks: Arc<dyn NotebookRepository>,
}

impl NotebookService {
    pub fn new(notebooks: Arc<dyn NotebookRepository>) -> Self {
        Self { notebooks }
    }

    pub async fn create(
        &self,
        user_id: i64,
        input: CreateNotebookInput,
    ) -> Result<Notebook, NotebookServiceError> {
        Ok(self.notebooks.create(user_id, &input).await?)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Notebook>, NotebookServiceError> {
        Ok(self.notebooks.list_by_user(user_id).await?)
    }

    pub async fn get(&self, id: i64, user_id: i64) -> Result<Notebook, NotebookServiceError> {
        self.notebooks
            .get_by_id(id, user_id)
            .await?
            .ok_or(NotebookServiceError::NotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        input: UpdateNotebookInput,
    ) -> Result<Notebook, NotebookServiceError> {
        if input.is_empty() {
            return Err(NotebookServiceError::EmptyUpdate);
        }

        if !self.notebooks.update(id, user_id, &input).await? {
            return Err(NotebookServiceError::NotFound);
        }

        self.get(id, user_id).await
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<(), NotebookServiceError> {
        if !self.notebooks.soft_delete(id, user_id).await? {
            return Err(NotebookServiceError::NotFound);
        }
        Ok(())
    }
}
