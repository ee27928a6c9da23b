use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::connection::SimpleConnection;
use serde::Serialize;

use kindred_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

const SERVICE: &str = "kindred-api";

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: &'static str,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("Welcome to {SERVICE}"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check that probes the database.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.db.get() {
        Ok(mut conn) => match conn.batch_execute("SELECT 1") {
            Ok(()) => HealthCheck::passing("database"),
            Err(e) => HealthCheck::failing("database", e.to_string()),
        },
        Err(e) => HealthCheck::failing("database", e.to_string()),
    };

    let response = HealthResponse::healthy(SERVICE, env!("CARGO_PKG_VERSION")).with_checks(vec![database]);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

/// Returns Prometheus metrics, or 404 when no recorder was installed.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
