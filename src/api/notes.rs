//! Note endpoints, nested under /notebooks/{notebookId}/notes

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses;
use crate::models::{CreateNoteInput, UpdateNoteInput};

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
}

fn require_title(title: &Option<String>) -> Result<String, ApiError> {
    title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("Title is required".to_string()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(notebook_id): Path<i64>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<Response, ApiError> {
    let title = require_title(&body.title)?;

    let note = state
        .notes
        .create(
            claims.id,
            notebook_id,
            CreateNoteInput {
                title,
                content: body.content,
            },
        )
        .await?;

    Ok(responses::created("Note created successfully", json!(note)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(notebook_id): Path<i64>,
) -> Result<Response, ApiError> {
    let notes = state.notes.list(notebook_id, claims.id).await?;
    Ok(responses::ok("Notes fetched successfully", json!(notes)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path((notebook_id, note_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let note = state.notes.get(note_id, notebook_id, claims.id).await?;
    Ok(responses::ok("Note fetched successfully", json!(note)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path((notebook_id, note_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateNoteRequest>,
) -> Result<Response, ApiError> {
    let title = require_title(&body.title)?;

    let note = state
        .notes
        .update(
            note_id,
            notebook_id,
            claims.id,
            UpdateNoteInput {
                title,
                content: body.content,
                is_pinned: body.is_pinned,
            },
        )
        .await?;

    Ok(responses::ok("Note updated successfully", json!(note)))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path((notebook_id, note_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    state.notes.delete(note_id, notebook_id, claims.id).await?;
    Ok(responses::ok_empty("Note deleted successfully"))
}
