use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User errors
/// - E3xxx: Subscriber errors
/// - E4xxx: Alert errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    BadRequest,

    // Auth (E1xxx)
    InvalidCredentials,
    TokenInvalid,
    TokenExpired,
    PasswordTooWeak,

    // Users (E2xxx)
    UsernameTaken,
    EmailAlreadyExists,
    UserNotFound,

    // Subscribers (E3xxx)
    SubscriberAlreadyExists,

    // Alerts (E4xxx)
    InvalidSeverity,
    InvalidCoverage,
    NoTargetsSpecified,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::BadRequest => "E0005",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::TokenInvalid => "E1002",
            Self::TokenExpired => "E1003",
            Self::PasswordTooWeak => "E1004",

            // Users
            Self::UsernameTaken => "E2001",
            Self::EmailAlreadyExists => "E2002",
            Self::UserNotFound => "E2003",

            // Subscribers
            Self::SubscriberAlreadyExists => "E3001",

            // Alerts
            Self::InvalidSeverity => "E4001",
            Self::InvalidCoverage => "E4002",
            Self::NoTargetsSpecified => "E4003",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::InvalidSeverity | Self::InvalidCoverage
            | Self::NoTargetsSpecified => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenInvalid
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::UsernameTaken | Self::EmailAlreadyExists
            | Self::SubscriberAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    /// Helper: convert an `AppError` into its JSON body value.
    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let err = AppError::new(ErrorCode::InvalidSeverity, "Invalid alert: bad severity");
        let value = body_json(err).await;

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E4001");
        assert_eq!(value["error"]["message"], "Invalid alert: bad severity");
    }

    #[tokio::test]
    async fn validation_errors_are_400() {
        for code in [
            ErrorCode::InvalidSeverity,
            ErrorCode::InvalidCoverage,
            ErrorCode::NoTargetsSpecified,
            ErrorCode::ValidationError,
        ] {
            let response = AppError::new(code, "bad input").into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn conflict_errors_are_409() {
        for code in [
            ErrorCode::UsernameTaken,
            ErrorCode::EmailAlreadyExists,
            ErrorCode::SubscriberAlreadyExists,
        ] {
            let response = AppError::new(code, "already there").into_response();
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }

    #[tokio::test]
    async fn auth_errors_are_401() {
        for code in [
            ErrorCode::Unauthorized,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenInvalid,
            ErrorCode::TokenExpired,
        ] {
            let response = AppError::new(code, "no").into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn database_not_found_maps_to_404() {
        let err = AppError::Database(diesel::result::Error::NotFound);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let value = body_json(AppError::Database(diesel::result::Error::NotFound)).await;
        assert_eq!(value["error"]["code"], "E0003");
    }

    #[tokio::test]
    async fn details_are_carried() {
        let err = AppError::with_details(
            ErrorCode::ValidationError,
            "invalid email",
            serde_json::json!({"field": "email"}),
        );
        let value = body_json(err).await;
        assert_eq!(value["error"]["details"]["field"], "email");
    }
}
