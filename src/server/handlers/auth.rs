use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::{hash_password, verify_password, Role};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Create an account. The first account on a fresh database becomes the
/// admin; everyone after that is a regular user.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let role = if state.users.count().await? == 0 {
        Role::Admin
    } else {
        Role::User
    };

    let password_hash = hash_password(&req.password)?;
    let user = state.users.create(username, &password_hash, role).await?;

    tracing::info!("registered account '{}' with role {}", user.username, user.role.as_str());

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "role": user.role,
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens.issue(&user.username, user.role).await;

    Ok(Json(json!({
        "token": token,
        "role": user.role,
    })))
}
