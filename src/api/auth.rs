//! Authentication endpoints
//!
//! POST /auth/register, POST /auth/login (public) and GET /auth/me
//! (protected).

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses;
use crate::models::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: Option<String>,
    pub password: Option<String>,
}

fn require_field<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

fn user_summary(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    const REQUIRED: &str = "All fields are required";
    let name = require_field(&body.name, REQUIRED)?;
    let username = require_field(&body.username, REQUIRED)?;
    let email = require_field(&body.email, REQUIRED)?;
    let password = require_field(&body.password, REQUIRED)?;

    let user = state.users.register(name, username, email, password).await?;

    Ok(responses::created(
        "User registered successfully",
        user_summary(&user),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    const REQUIRED: &str = "Username/email and password are required";
    let identifier = require_field(&body.identifier, REQUIRED)?;
    let password = require_field(&body.password, REQUIRED)?;

    let (user, token) = state.users.login(identifier, password).await?;

    Ok(responses::ok(
        "Login successful",
        json!({
            "token": token,
            "user": user_summary(&user),
        }),
    ))
}

pub async fn me(CurrentUser(claims): CurrentUser) -> Response {
    responses::ok(
        "Authenticated user fetched successfully",
        json!({
            "id": claims.id,
            "name": claims.name,
            "email": claims.email,
        }),
    )
}
