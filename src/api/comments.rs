//! Comment endpoints
//!
//! Creation and listing are nested under /posts/{id}/comments; editing and
//! deletion address the comment directly under /comments/{id}.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses;
use crate::models::CreateCommentInput;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: Option<String>,
    pub parent_id: Option<i64>,
}

fn require_comment(comment: &Option<String>) -> Result<String, ApiError> {
    comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("Comment text is required".to_string()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(post_id): Path<i64>,
    Json(body): Json<CommentRequest>,
) -> Result<Response, ApiError> {
    let comment = require_comment(&body.comment)?;

    let created = state
        .comments
        .create(
            post_id,
            claims.id,
            CreateCommentInput {
                comment,
                parent_id: body.parent_id,
            },
        )
        .await?;

    Ok(responses::created(
        "Comment created successfully",
        json!(created),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    let comments = state.comments.list(post_id).await?;
    Ok(responses::ok(
        "Comments fetched successfully",
        json!(comments),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<CommentRequest>,
) -> Result<Response, ApiError> {
    let comment = require_comment(&body.comment)?;

    let updated = state.comments.update(id, claims.id, &comment).await?;
    Ok(responses::ok(
        "Comment updated successfully",
        json!(updated),
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    state.comments.delete(id, claims.id).await?;
    Ok(responses::ok_empty("Comment deleted successfully"))
}
