//! Password hashing and bearer-token session handling.
//!
//! Tokens are opaque server-side handles: issued at login, kept in memory,
//! and invalidated by process restart. No claims are encoded in the token
//! itself.

use std::collections::HashMap;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn from_str(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub username: String,
    pub role: Role,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(ApiError::internal)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// In-memory session registry keyed by token value.
pub struct TokenStore {
    sessions: RwLock<HashMap<String, AuthSession>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn issue(&self, username: &str, role: Role) -> String {
        let token = format!("{}{}", Uuid::new_v4(), Uuid::new_v4());
        let session = AuthSession {
            username: username.to_string(),
            role,
        };
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<AuthSession> {
        self.sessions.read().await.get(token).cloned()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_auth(headers: &HeaderMap, tokens: &TokenStore) -> Result<AuthSession, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    tokens.resolve(token).await.ok_or(ApiError::Unauthorized)
}

pub async fn require_admin(headers: &HeaderMap, tokens: &TokenStore) -> Result<AuthSession, ApiError> {
    let session = require_auth(headers, tokens).await?;
    if session.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn issued_token_resolves_to_session() {
        let store = TokenStore::new();
        let token = store.issue("alice", Role::Admin).await;

        let session = store.resolve(&token).await.unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.role, Role::Admin);

        assert!(store.resolve("unknown-token").await.is_none());
    }

    #[tokio::test]
    async fn require_auth_accepts_bearer_header() {
        let store = TokenStore::new();
        let token = store.issue("bob", Role::User).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let session = require_auth(&headers, &store).await.unwrap();
        assert_eq!(session.username, "bob");
    }

    #[tokio::test]
    async fn require_auth_rejects_missing_or_invalid_token() {
        let store = TokenStore::new();

        let missing = require_auth(&HeaderMap::new(), &store).await;
        assert!(matches!(missing, Err(ApiError::Unauthorized)));

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer wrong"),
        );
        let invalid = require_auth(&headers, &store).await;
        assert!(matches!(invalid, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn require_admin_rejects_user_role() {
        let store = TokenStore::new();
        let token = store.issue("carol", Role::User).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let result = require_admin(&headers, &store).await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }
}
