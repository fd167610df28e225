use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use dora_shared::errors::{AppError, AppResult, ErrorCode};
use dora_shared::types::auth::AuthUser;
use dora_shared::types::ApiResponse;

use crate::models::{NewSubscriber, Subscriber};
use crate::schema::subscribers;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    pub first_name: String,
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub phone_number: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub pin_code: i32,
    pub city: String,
    pub state: String,
    pub country: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SubscriberFilter {
    pub email: Option<String>,
    pub pin_code: Option<i32>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribersResponse {
    pub subscribers: Vec<Subscriber>,
}

/// POST /subscribe
pub async fn subscribe(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubscribeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Subscriber>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    tracing::info!(
        email = %req.email,
        user = %auth_user.username,
        "registering subscriber"
    );

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Email and phone number are both unique in the directory.
    let exists: bool = subscribers::table
        .filter(
            subscribers::email
                .eq(&req.email)
                .or(subscribers::phone_number.eq(&req.phone_number)),
        )
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if exists {
        return Err(AppError::new(
            ErrorCode::SubscriberAlreadyExists,
            "subscriber with this email or phone number already exists",
        ));
    }

    let new_subscriber = NewSubscriber {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone_number: req.phone_number,
        language: req.language,
        pin_code: req.pin_code,
        city: req.city,
        state: req.state,
        country: req.country,
    };

    // The existence check above races concurrent subscriptions; a
    // unique violation on the insert is still the same conflict.
    let subscriber: Subscriber = diesel::insert_into(subscribers::table)
        .values(&new_subscriber)
        .get_result(&mut conn)
        .map_err(subscriber_conflict)?;

    tracing::info!(email = %subscriber.email, "subscriber registered");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(subscriber))))
}

fn subscriber_conflict(e: diesel::result::Error) -> AppError {
    match e {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AppError::new(
                ErrorCode::SubscriberAlreadyExists,
                "subscriber with this email or phone number already exists",
            )
        }
        other => other.into(),
    }
}

/// GET /subscribers?email=&pin_code=&city=
///
/// Filters are exact-match and AND-combined; absent filters match all.
pub async fn list_subscribers(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubscriberFilter>,
) -> AppResult<Json<ApiResponse<SubscribersResponse>>> {
    tracing::info!(user = %auth_user.username, "retrieving subscribers");

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = subscribers::table.into_boxed();
    if let Some(email) = &params.email {
        query = query.filter(subscribers::email.eq(email));
    }
    if let Some(pin_code) = params.pin_code {
        query = query.filter(subscribers::pin_code.eq(pin_code));
    }
    if let Some(city) = &params.city {
        query = query.filter(subscribers::city.eq(city));
    }

    let subscribers = query.load::<Subscriber>(&mut conn)?;

    Ok(Json(ApiResponse::ok(SubscribersResponse { subscribers })))
}
