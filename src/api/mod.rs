//! HTTP API layer
//!
//! Routes are nested under /api/v1. Auth endpoints are public; everything
//! else sits behind the bearer-token middleware.

pub mod auth;
pub mod comments;
pub mod middleware;
pub mod notebooks;
pub mod notes;
pub mod posts;
pub mod responses;
pub mod todos;

use axum::http::{header, HeaderValue, Method};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{extract::State, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, CurrentUser};

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/{id}",
            get(todos::get).put(todos::update).delete(todos::remove),
        )
        .route("/notebooks", get(notebooks::list).post(notebooks::create))
        .route(
            "/notebooks/{id}",
            get(notebooks::get)
                .put(notebooks::update)
                .delete(notebooks::remove),
        )
        .route(
            "/notebooks/{notebookId}/notes",
            get(notes::list).post(notes::create),
        )
        .route(
            "/notebooks/{notebookId}/notes/{noteId}",
            get(notes::get).put(notes::update).delete(notes::remove),
        )
        .route("/posts", get(posts::list).post(posts::create))
        .route(
            "/posts/{id}",
            get(posts::get).put(posts::update).delete(posts::remove),
        )
        .route("/posts/{id}/like", post(posts::toggle_like))
        .route(
            "/posts/{id}/comments",
            get(comments::list).post(comments::create),
        )
        .route(
            "/comments/{id}",
            put(comments::update).delete(comments::remove),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer for the configured SPA origin
fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            tracing::warn!(origin, "Invalid CORS origin in config, allowing none");
            cors
        }
    }
}

/// Health endpoint reporting database connectivity
async fn health(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.pool.ping().await?;
    Ok(responses::ok("ok", json!({ "database": "up" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::{create_test_pool, migrations};
    use axum_test::TestServer;
    use serde_json::Value;

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(Config::default(), pool);
        TestServer::new(build_router(state)).expect("Failed to build test server")
    }

    async fn register_and_login(server: &TestServer, username: &str) -> String {
        server
            .post("/api/v1/auth/register")
            .json(&json!({
                "name": "Test User",
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "pass1234",
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "identifier": username, "password": "pass1234" }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("Login should return a token")
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server().await;
        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["database"], "up");
    }

    #[tokio::test]
    async fn test_register_validation_and_duplicates() {
        let server = test_server().await;

        // Missing fields
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({ "name": "No Email", "username": "noemail" }))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);

        // First registration succeeds
        register_and_login(&server, "original").await;

        // Duplicate email
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "name": "Clone",
                "username": "clone",
                "email": "original@example.com",
                "password": "pass1234",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Email already exists");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let server = test_server().await;

        let response = server.get("/api/v1/todos").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Access denied! Please login first.");

        let response = server
            .get("/api/v1/todos")
            .authorization_bearer("not-a-real-token")
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Invalid token. Access denied.");
    }

    #[tokio::test]
    async fn test_todo_crud_flow() {
        let server = test_server().await;
        let token = register_and_login(&server, "todoer").await;

        // Create
        let response = server
            .post("/api/v1/todos")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Write tests",
                "description": "All of them",
                "due_date": "2026-09-01",
                "status": "pending",
                "priority": "high",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        let todo_id = body["data"]["id"].as_i64().expect("Todo should have id");

        // List
        let response = server
            .get("/api/v1/todos")
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // Partial update
        let response = server
            .put(&format!("/api/v1/todos/{}", todo_id))
            .authorization_bearer(&token)
            .json(&json!({ "status": "completed" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "completed");
        assert_eq!(body["data"]["title"], "Write tests");

        // Empty update is a 400
        let response = server
            .put(&format!("/api/v1/todos/{}", todo_id))
            .authorization_bearer(&token)
            .json(&json!({}))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);

        // Delete, then reads 404
        let response = server
            .delete(&format!("/api/v1/todos/{}", todo_id))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();

        let response = server
            .get(&format!("/api/v1/todos/{}", todo_id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_todo_reads_as_not_found() {
        let server = test_server().await;
        let alice = register_and_login(&server, "alice").await;
        let bob = register_and_login(&server, "bob").await;

        let response = server
            .post("/api/v1/todos")
            .authorization_bearer(&alice)
            .json(&json!({
                "title": "Secret",
                "description": "Mine",
                "due_date": "2026-09-01",
                "status": "pending",
                "priority": "low",
            }))
            .await;
        let body: Value = response.json();
        let todo_id = body["data"]["id"].as_i64().unwrap();

        let response = server
            .get(&format!("/api/v1/todos/{}", todo_id))
            .authorization_bearer(&bob)
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notebook_and_note_flow() {
        let server = test_server().await;
        let token = register_and_login(&server, "writer").await;

        let response = server
            .post("/api/v1/notebooks")
            .authorization_bearer(&token)
            .json(&json!({ "title": "Journal" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["color"], "#fff");
        let notebook_id = body["data"]["id"].as_i64().unwrap();

        // Note in a missing notebook is a 404
        let response = server
            .post("/api/v1/notebooks/999/notes")
            .authorization_bearer(&token)
            .json(&json!({ "title": "Orphan" }))
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);

        let response = server
            .post(&format!("/api/v1/notebooks/{}/notes", notebook_id))
            .authorization_bearer(&token)
            .json(&json!({ "title": "Entry", "content": "Dear diary" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        let note_id = body["data"]["id"].as_i64().unwrap();

        let response = server
            .put(&format!(
                "/api/v1/notebooks/{}/notes/{}",
                notebook_id, note_id
            ))
            .authorization_bearer(&token)
            .json(&json!({ "title": "Entry", "is_pinned": true }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["is_pinned"], true);
    }

    #[tokio::test]
    async fn test_post_comment_like_flow() {
        let server = test_server().await;
        let author = register_and_login(&server, "author").await;
        let reader = register_and_login(&server, "reader").await;

        let response = server
            .post("/api/v1/posts")
            .authorization_bearer(&author)
            .json(&json!({
                "title": "Hello World",
                "content": "First post",
                "tags": ["Intro", "intro", "meta"],
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        let post_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["slug"], "hello-world");
        assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);

        // Like toggle
        let response = server
            .post(&format!("/api/v1/posts/{}/like", post_id))
            .authorization_bearer(&reader)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["liked"], true);
        assert_eq!(body["data"]["like_count"], 1);

        let response = server
            .post(&format!("/api/v1/posts/{}/like", post_id))
            .authorization_bearer(&reader)
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["liked"], false);
        assert_eq!(body["data"]["like_count"], 0);

        // Comment
        let response = server
            .post(&format!("/api/v1/posts/{}/comments", post_id))
            .authorization_bearer(&reader)
            .json(&json!({ "comment": "Nice one" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/posts/{}/comments", post_id))
            .authorization_bearer(&author)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["comment"], "Nice one");
        assert_eq!(body["data"][0]["user"]["name"], "Test User");

        // Reader cannot delete the author's post
        let response = server
            .delete(&format!("/api/v1/posts/{}", post_id))
            .authorization_bearer(&reader)
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);

        // Author deletes; post and its comments disappear
        let response = server
            .delete(&format!("/api/v1/posts/{}", post_id))
            .authorization_bearer(&author)
            .await;
        response.assert_status_ok();

        let response = server
            .get(&format!("/api/v1/posts/{}", post_id))
            .authorization_bearer(&reader)
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_post_list_is_ok() {
        let server = test_server().await;
        let token = register_and_login(&server, "lurker").await;

        let response = server
            .get("/api/v1/posts")
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], json!([]));
    }
}
