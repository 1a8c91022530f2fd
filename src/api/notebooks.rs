//! Notebook endpoints

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses;
use crate::models::{CreateNotebookInput, UpdateNotebookInput};

#[derive(Debug, Deserialize)]
pub struct CreateNotebookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateNotebookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(body): Json<CreateNotebookRequest>,
) -> Result<Response, ApiError> {
    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("Title is required".to_string()))?;

    let notebook = state
        .notebooks
        .create(
            claims.id,
            CreateNotebookInput {
                title: title.to_string(),
                description: body.description,
                color: body.color,
            },
        )
        .await?;

    Ok(responses::created(
        "Notebook created successfully",
        json!(notebook),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Response, ApiError> {
    let notebooks = state.notebooks.list(claims.id).await?;
    Ok(responses::ok(
        "Notebooks fetched successfully",
        json!(notebooks),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let notebook = state.notebooks.get(id, claims.id).await?;
    Ok(responses::ok(
        "Notebook fetched successfully",
        json!(notebook),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNotebookRequest>,
) -> Result<Response, ApiError> {
    let input = UpdateNotebookInput {
        title: body.title,
        description: body.description,
        color: body.color,
    };

    let notebook = state.notebooks.update(id, claims.id, input).await?;
    Ok(responses::ok(
        "Notebook updated successfully",
        json!(notebook),
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    state.notebooks.delete(id, claims.id).await?;
    Ok(responses::ok_empty("Notebook deleted successfully"))
}
