//! # Health Check Handler

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Liveness check: GET /health
pub async fn basic_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
