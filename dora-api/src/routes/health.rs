use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use dora_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// GET /
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Welcome to Dora!"}))
}

/// Health check that probes the database pool.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let database = match probe_database(&state) {
        Ok(()) => HealthCheck::healthy("database"),
        Err(message) => HealthCheck::unhealthy("database", message),
    };

    let response = HealthResponse::healthy("dora-api", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![database]);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

fn probe_database(state: &AppState) -> Result<(), String> {
    let mut conn = state.db.get().map_err(|e| e.to_string())?;
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
