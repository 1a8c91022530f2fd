//! User service
//!
//! Registration and login. Duplicate checks run before the insert so the API
//! can tell the caller which field collided; login accepts a username or an
//! email and answers both failure modes with the same message.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AuthConfig;
use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use crate::services::token::issue_token;

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("Email already exists")]
    EmailExists,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid email/username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// User service handling registration and login
pub struct UserService {
    users: Arc<dyn UserRepository>,
    auth: AuthConfig,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, auth: AuthConfig) -> Self {
        Self { users, auth }
    }

    /// Register a new user
    pub async fn register(
        &self,
        name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        if self.users.get_by_email(email).await?.is_some() {
            return Err(UserServiceError::EmailExists);
        }
        if self.users.get_by_username(username).await?.is_some() {
            return Err(UserServiceError::UsernameTaken);
        }

        let password_hash = hash_password(password)?;
        let user = User::new(
            name.to_string(),
            username.to_string(),
            email.to_string(),
            password_hash,
        );

        let created = self.users.create(&user).await?;
        tracing::info!(user_id = created.id, username = %created.username, "User registered");

        Ok(created)
    }

    /// Log in with a username or email. Returns the user and a signed token.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(User, String), UserServiceError> {
        let user = self
            .users
            .get_by_identifier(identifier)
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::InvalidCredentials);
        }

        let token = issue_token(&user, &self.auth.jwt_secret, self.auth.token_ttl_hours)
            .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;

        tracing::debug!(user_id = user.id, "User logged in");
        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::services::token::verify_token;

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        UserService::new(SqlxUserRepository::boxed(pool), AuthConfig::default())
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = setup().await;

        let user = service
            .register("Alice", "alice", "alice@example.com", "hunter2!")
            .await
            .expect("Failed to register");
        assert!(user.id > 0);
        assert!(user.password_hash.starts_with("$argon2id$"));

        let (logged_in, token) = service
            .login("alice", "hunter2!")
            .await
            .expect("Failed to login");
        assert_eq!(logged_in.id, user.id);

        let claims =
            verify_token(&token, &AuthConfig::default().jwt_secret).expect("Token should verify");
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let service = setup().await;
        service
            .register("Bob", "bob", "bob@example.com", "pw123456")
            .await
            .unwrap();

        let result = service.login("bob@example.com", "pw123456").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let service = setup().await;
        service
            .register("Carol", "carol", "carol@example.com", "pw123456")
            .await
            .unwrap();

        let result = service
            .register("Carla", "carla", "carol@example.com", "pw123456")
            .await;
        assert!(matches!(result, Err(UserServiceError::EmailExists)));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let service = setup().await;
        service
            .register("Dave", "dave", "dave@example.com", "pw123456")
            .await
            .unwrap();

        let result = service
            .register("Dave 2", "dave", "dave2@example.com", "pw123456")
            .await;
        assert!(matches!(result, Err(UserServiceError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let service = setup().await;
        service
            .register("Eve", "eve", "eve@example.com", "pw123456")
            .await
            .unwrap();

        let wrong_password = service.login("eve", "wrong").await;
        assert!(matches!(
            wrong_password,
            Err(UserServiceError::InvalidCredentials)
        ));

        let unknown_user = service.login("nobody", "pw123456").await;
        assert!(matches!(
            unknown_user,
            Err(UserServiceError::InvalidCredentials)
        ));
    }
}
