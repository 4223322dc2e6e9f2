//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub notifications: NotificationsHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Notification delivery settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationsHealth {
    pub enabled: bool,
    pub provider: String,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check.
///
/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let latency = persistence::db::ping(&state.pool).await;

    let response = HealthResponse {
        status: if latency.is_ok() { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: latency.is_ok(),
            latency_ms: latency.as_ref().ok().map(|d| d.as_millis() as u64),
        },
        notifications: NotificationsHealth {
            enabled: state.config.email.enabled,
            provider: state.config.email.provider.clone(),
        },
    };

    if let Err(e) = latency {
        tracing::warn!(error = %e, "Health check failed to reach database");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(response))
}

/// Liveness probe. Returns 200 OK if the process is running.
///
/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe. Returns 200 OK if the database is reachable.
///
/// GET /api/health/ready
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    match persistence::db::ping(&state.pool).await {
        Ok(_) => Ok(Json(StatusResponse {
            status: "ready".to_string(),
        })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
