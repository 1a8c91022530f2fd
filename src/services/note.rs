//! Note service
//!
//! Notes are reached through their notebook, so the notebook is resolved
//! first and a missing or foreign notebook reads as not found.

use std::sync::Arc;

use thiserror::Error;

use crate::db::repositories::{NotebookRepository, NoteRepository};
use crate::models::{CreateNoteInput, Note, UpdateNoteInput};

/// Note service errors
#[derive(Debug, Error)]
pub enum NoteServiceError {
    #[error("Notebook not found")]
    NotebookNotFound,

    #[error("Note not found")]
    NoteNotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Note business logic
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    notebooks: Arc<dyn NotebookRepository>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteRepository>, notebooks: Arc<dyn NotebookRepository>) -> Self {
        Self { notes, notebooks }
    }

    async fn check_notebook(&self, notebook_id: i64, user_id: i64) -> Result<(), NoteServiceError> {
        self.notebooks
            .get_by_id(notebook_id, user_id)
            .await?
            .ok_or(NoteServiceError::NotebookNotFound)?;
        Ok(())
    }

    pub async fn create(
        &self,
        user_id: i64,
        notebook_id: i64,
        input: CreateNoteInput,
    ) -> Result<Note, NoteServiceError> {
        self.check_notebook(notebook_id, user_id).await?;
        Ok(self.notes.create(user_id, notebook_id, &input).await?)
    }

    pub async fn list(&self, notebook_id: i64, user_id: i64) -> Result<Vec<Note>, NoteServiceError> {
        self.check_notebook(notebook_id, user_id).await?;
        Ok(self.notes.list_by_notebook(notebook_id, user_id).await?)
    }

    pub async fn get(
        &self,
        id: i64,
        notebook_id: i64,
        user_id: i64,
    ) -> Result<Note, NoteServiceError> {
        self.notes
            .get_by_id(id, notebook_id, user_id)
            .await?
            .ok_or(NoteServiceError::NoteNotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        notebook_id: i64,
        user_id: i64,
        input: UpdateNoteInput,
    ) -> Result<Note, NoteServiceError> {
        if !self.notes.update(id, notebook_id, user_id, &input).await? {
            return Err(NoteServiceError::NoteNotFound);
        }
        self.get(id, notebook_id, user_id).await
    }

    pub async fn delete(
        &self,
        id: i64,
        notebook_id: i64,
        user_id: i64,
    ) -> Result<(), NoteServiceError> {
        if !self.notes.soft_delete(id, notebook_id, user_id).await? {
            return Err(NoteServiceError::NoteNotFound);
        }
        Ok(())
    }
}
