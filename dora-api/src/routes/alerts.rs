use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use dora_shared::errors::{AppError, AppResult};
use dora_shared::types::auth::AuthUser;
use dora_shared::types::ApiResponse;

use crate::models::Alert;
use crate::services::alert_service::{self, AlertItem};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertsCreateRequest {
    pub alerts: Vec<AlertItem>,
}

#[derive(Debug, Deserialize)]
pub struct ListAlertsParams {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    1
}

/// POST /alerts
///
/// Validates the whole batch, stores it atomically, then fans out
/// notifications. Returns the stored (or pre-existing) records in
/// request order.
pub async fn create_alerts(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AlertsCreateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<Alert>>>)> {
    let records = alert_service::create_alerts(&state, &auth_user.username, &req.alerts).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(records))))
}

/// GET /alerts?days=N
pub async fn list_alerts(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListAlertsParams>,
) -> AppResult<Json<ApiResponse<Vec<Alert>>>> {
    if params.days < 0 {
        return Err(AppError::bad_request("days must not be negative"));
    }

    tracing::info!(user = %auth_user.username, days = params.days, "listing alerts");

    let alerts = alert_service::list_alerts(&state.db, params.days)?;
    Ok(Json(ApiResponse::ok(alerts)))
}
