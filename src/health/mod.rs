/*!
 * # Health Check Module
 *
 * Endpoints for monitoring the health of the Backhouse API:
 *
 * - Basic health check (`/health`) - Overall status plus the database probe
 * - Readiness check (`/health/ready`) - Whether the system can serve traffic
 * - Liveness check (`/health/live`) - Whether the process is alive
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

async fn probe_database(state: &AppState) -> HealthStatus {
    match state.db.ping().await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            warn!("database health probe failed: {}", e);
            HealthStatus::Down
        }
    }
}

/// Basic health check. 503 when the database probe fails.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = probe_database(&state).await;
    let info = HealthInfo {
        status: database,
        database,
        timestamp: Utc::now(),
    };
    let code = match info.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(info))
}

/// Readiness: the service can take traffic once the database answers.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    health_check(State(state)).await
}

/// Liveness: the process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "up",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Health endpoints served outside the versioned API.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}
