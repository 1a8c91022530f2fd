//! Todo endpoints

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses;
use crate::models::{CreateTodoInput, TodoPriority, TodoStatus, UpdateTodoInput};

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(body): Json<CreateTodoRequest>,
) -> Result<Response, ApiError> {
    const REQUIRED: &str = "All fields are required";

    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;
    let due_date = body
        .due_date
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;
    let status = body
        .status
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;
    let priority = body
        .priority
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;

    let todo = state
        .todos
        .create(
            claims.id,
            CreateTodoInput {
                title: title.to_string(),
                description: description.to_string(),
                due_date,
                status,
                priority,
            },
        )
        .await?;

    Ok(responses::created("Todo created successfully", json!(todo)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Response, ApiError> {
    let todos = state.todos.list(claims.id).await?;
    Ok(responses::ok("Todos fetched successfully", json!(todos)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let todo = state.todos.get(id, claims.id).await?;
    Ok(responses::ok("Todo fetched successfully", json!(todo)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<Response, ApiError> {
    let input = UpdateTodoInput {
        title: body.title,
        description: body.description,
        due_date: body.due_date,
        status: body.status,
        priority: body.priority,
    };

    let todo = state.todos.update(id, claims.id, input).await?;
    Ok(responses::ok("Todo updated successfully", json!(todo)))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    state.todos.delete(id, claims.id).await?;
    Ok(responses::ok_empty("Todo deleted successfully"))
}
