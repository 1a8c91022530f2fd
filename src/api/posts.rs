//! Post endpoints, including the like toggle

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses;
use crate::models::{CreatePostInput, UpdatePostInput};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<Response, ApiError> {
    const REQUIRED: &str = "Title and content are required";

    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;
    let content = body
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;

    let post = state
        .posts
        .create(
            claims.id,
            CreatePostInput {
                title: title.to_string(),
                content: content.to_string(),
                image_url: body.image_url,
                tags: body.tags,
            },
        )
        .await?;

    Ok(responses::created("Post created successfully", json!(post)))
}

pub async fn list(State(state): State<AppState>) -> Result<Response, ApiError> {
    let posts = state.posts.list().await?;
    Ok(responses::ok("Posts fetched successfully", json!(posts)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let post = state.posts.get(id).await?;
    Ok(responses::ok("Post fetched successfully", json!(post)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Response, ApiError> {
    let input = UpdatePostInput {
        title: body.title,
        content: body.content,
        image_url: body.image_url,
        tags: body.tags,
    };

    let post = state.posts.update(id, claims.id, input).await?;
    Ok(responses::ok("Post updated successfully", json!(post)))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    state.posts.delete(id, claims.id).await?;
    Ok(responses::ok_empty("Post deleted successfully"))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (liked, like_count) = state.posts.toggle_like(id, claims.id).await?;

    let message = if liked {
        "Post liked successfully"
    } else {
        "Post unliked successfully"
    };

    Ok(responses::ok(
        message,
        json!({ "liked": liked, "like_count": like_count }),
    ))
}
