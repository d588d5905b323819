use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CampusCareServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
    /// API version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Individual service health checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    /// Application name
    #[schema(example = "CampusCare Engine")]
    pub name: String,
    /// Application version
    pub version: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(server): State<CampusCareServer>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let mut checks = HashMap::new();

    let db_status = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&server.db_pool)
        .await
    {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };
    checks.insert("database".to_string(), db_status.to_string());

    let status = if checks.values().all(|v| v == "healthy") {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(api_success(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    })))
}

/// Version information endpoint
#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Version information", body = VersionResponse)
    ),
    tag = "health"
)]
pub async fn version_info(
    State(server): State<CampusCareServer>,
) -> Json<ApiResponse<VersionResponse>> {
    Json(api_success(VersionResponse {
        name: server.config.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
