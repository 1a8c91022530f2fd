//! API middleware, shared state, and error mapping
//!
//! `AppState` wires the repositories and services together once at startup.
//! `require_auth` verifies the bearer token on protected routes and stashes
//! the decoded claims in request extensions, where `CurrentUser` picks them
//! up without another database hit.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::Config;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxNotebookRepository, SqlxNoteRepository, SqlxPostRepository,
    SqlxTodoRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::token::verify_token;
use crate::services::{
    Claims, CommentService, CommentServiceError, NoteService, NoteServiceError, NotebookService,
    NotebookServiceError, PostService, PostServiceError, TodoService, TodoServiceError,
    UserService, UserServiceError,
};

const LOGIN_REQUIRED: &str = "Access denied! Please login first.";
const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: DynDatabasePool,
    pub users: Arc<UserService>,
    pub todos: Arc<TodoService>,
    pub notebooks: Arc<NotebookService>,
    pub notes: Arc<NoteService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    /// Build the full service graph on top of a database pool
    pub fn new(config: Config, pool: DynDatabasePool) -> Self {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let todo_repo = SqlxTodoRepository::boxed(pool.clone());
        let notebook_repo = SqlxNotebookRepository::boxed(pool.clone());
        let note_repo = SqlxNoteRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        Self {
            users: Arc::new(UserService::new(user_repo, config.auth.clone())),
            todos: Arc::new(TodoService::new(todo_repo)),
            notebooks: Arc::new(NotebookService::new(notebook_repo.clone())),
            notes: Arc::new(NoteService::new(note_repo, notebook_repo)),
            posts: Arc::new(PostService::new(post_repo.clone())),
            comments: Arc::new(CommentService::new(comment_repo, post_repo)),
            config: Arc::new(config),
            pool,
        }
    }
}

/// API error type mapped onto HTTP statuses.
///
/// Internal errors are logged and the client gets a generic message; the
/// underlying error text never leaves the process.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    Validation(String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 404 Not Found
    NotFound(String),
    /// 500 Internal Server Error
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(error) => {
                tracing::error!(error = ?error, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error)
    }
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        match error {
            UserServiceError::EmailExists | UserServiceError::UsernameTaken => {
                ApiError::Validation(error.to_string())
            }
            UserServiceError::InvalidCredentials => ApiError::Unauthorized(error.to_string()),
            UserServiceError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<TodoServiceError> for ApiError {
    fn from(error: TodoServiceError) -> Self {
        match error {
            TodoServiceError::NotFound => ApiError::NotFound(error.to_string()),
            TodoServiceError::EmptyUpdate => ApiError::Validation(error.to_string()),
            TodoServiceError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<NotebookServiceError> for ApiError {
    fn from(error: NotebookServiceError) -> Self {
        match error {
            NotebookServiceError::NotFound => ApiError::NotFound(error.to_string()),
            NotebookServiceError::EmptyUpdate => ApiError::Validation(error.to_string()),
            NotebookServiceError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<NoteServiceError> for ApiError {
    fn from(error: NoteServiceError) -> Self {
        match error {
            NoteServiceError::NotebookNotFound | NoteServiceError::NoteNotFound => {
                ApiError::NotFound(error.to_string())
            }
            NoteServiceError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<PostServiceError> for ApiError {
    fn from(error: PostServiceError) -> Self {
        match error {
            PostServiceError::NotFound => ApiError::NotFound(error.to_string()),
            PostServiceError::EmptyUpdate => ApiError::Validation(error.to_string()),
            PostServiceError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(error: CommentServiceError) -> Self {
        match error {
            CommentServiceError::PostNotFound | CommentServiceError::CommentNotFound => {
                ApiError::NotFound(error.to_string())
            }
            CommentServiceError::Internal(e) => ApiError::Internal(e),
        }
    }
}

/// Authenticated user claims, extracted from request extensions.
///
/// Only available behind the `require_auth` middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized(LOGIN_REQUIRED.to_string()))
    }
}

/// Pull the token out of the `Authorization: Bearer ...` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that rejects requests without a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized(LOGIN_REQUIRED.to_string()))?
        .to_string();

    let claims = verify_token(&token, &state.config.auth.jwt_secret)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
