use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

use crate::AppState;

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

/// Individual component health details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub database: ComponentHealth,
    /// Products in the store, absent when the database is unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<u64>,
}

/// Reports database reachability and catalog size
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_check_start = Instant::now();
    let db_result = crate::db::check_connection(&state.db).await;
    let latency_ms = db_check_start.elapsed().as_millis() as u64;

    let (status_code, status, database, products) = match db_result {
        Ok(()) => {
            // a failing count still means the schema is unusable
            match state.products.count().await {
                Ok(count) => (
                    StatusCode::OK,
                    ComponentStatus::Up,
                    ComponentHealth {
                        status: ComponentStatus::Up,
                        latency_ms: Some(latency_ms),
                        error: None,
                    },
                    Some(count),
                ),
                Err(e) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ComponentStatus::Down,
                    ComponentHealth {
                        status: ComponentStatus::Down,
                        latency_ms: Some(latency_ms),
                        error: Some(e.response_message()),
                    },
                    None,
                ),
            }
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ComponentStatus::Down,
            ComponentHealth {
                status: ComponentStatus::Down,
                latency_ms: None,
                error: Some(e.response_message()),
            },
            None,
        ),
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
        products,
    };

    (status_code, Json(body))
}
