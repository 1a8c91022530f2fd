//! JWT token service
//!
//! Issues and verifies HS256 bearer tokens. Claims carry the user's id, name,
//! and email so protected handlers don't need a database round trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::User;

/// Claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
}

/// Token verification failures that map to distinct client messages
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Session expired. Please login again.")]
    Expired,
    #[error("Invalid token. Access denied.")]
    Invalid,
}

/// Issue a signed token for a user
pub fn issue_token(user: &User, secret: &str, ttl_hours: i64) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| TokenError::Invalid)
}

/// Verify a token and return its claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 42,
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_trip() {
        let token = issue_token(&test_user(), "secret", 24).expect("Failed to issue token");
        let claims = verify_token(&token, "secret").expect("Failed to verify token");

        assert_eq!(claims.id, 42);
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&test_user(), "secret", 24).unwrap();
        let result = verify_token(&token, "other-secret");
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(&test_user(), "secret", -1).unwrap();
        let result = verify_token(&token, "secret");
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = verify_token("not.a.jwt", "secret");
        assert!(matches!(result, Err(TokenError::Invalid)));
    }
}
