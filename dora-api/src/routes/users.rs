use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use dora_shared::errors::{AppError, AppResult, ErrorCode};
use dora_shared::types::ApiResponse;

use crate::models::{NewUser, User};
use crate::schema::users;
use crate::services::auth_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    auth_service::validate_password(&req.password)?;

    let password_hash = auth_service::hash_password(&req.password)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let username_taken: bool = users::table
        .filter(users::username.eq(&req.username))
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if username_taken {
        return Err(AppError::new(ErrorCode::UsernameTaken, "username already taken"));
    }

    let email_taken: bool = users::table
        .filter(users::email.eq(&req.email))
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if email_taken {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    let new_user = NewUser {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        password_hash,
    };

    // The taken checks above race concurrent registrations; a unique
    // violation from the insert still answers the same conflict.
    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
                unique_violation_conflict(info.constraint_name())
            }
            other => AppError::from(other),
        })?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

fn unique_violation_conflict(constraint: Option<&str>) -> AppError {
    if constraint.is_some_and(|name| name.contains("email")) {
        AppError::new(ErrorCode::EmailAlreadyExists, "email already registered")
    } else {
        AppError::new(ErrorCode::UsernameTaken, "username already taken")
    }
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UsersResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let users = users::table.load::<User>(&mut conn)?;
    if users.is_empty() {
        return Err(AppError::not_found("No users in the database."));
    }

    Ok(Json(ApiResponse::ok(UsersResponse { users })))
}

/// GET /users/:username
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = users::table
        .filter(users::username.eq(&username))
        .first::<User>(&mut conn)
        .optional()?;

    match user {
        Some(user) => {
            tracing::info!(username = %user.username, "user fetched");
            Ok(Json(ApiResponse::ok(user)))
        }
        None => {
            tracing::warn!(username = %username, "user not registered");
            Err(AppError::new(
                ErrorCode::UserNotFound,
                format!("User with username: {username} does not exist."),
            ))
        }
    }
}
