use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use dora_shared::errors::{AppError, AppResult, ErrorCode};
use dora_shared::types::auth::AccessToken;
use dora_shared::types::ApiResponse;

use crate::models::User;
use crate::schema::users;
use crate::services::{auth_service, token_service};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /login
///
/// An unknown username and a wrong password fail the same way, so the
/// endpoint cannot be used to probe which usernames exist.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let found = users::table
        .filter(users::username.eq(&req.username))
        .first::<User>(&mut conn)
        .optional()?;
    let user = require_account(found)?;

    let valid = auth_service::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid username or password"));
    }

    let token = token_service::create_access_token(
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    tracing::info!(username = %user.username, "user logged in");

    Ok(Json(ApiResponse::ok(AccessToken::new(
        token,
        state.config.jwt_access_ttl,
    ))))
}

/// Only an absent row is a credentials failure. Query errors keep
/// their own status so an outage does not read as a bad password.
fn require_account(found: Option<User>) -> AppResult<User> {
    found.ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid username or password"))
}
