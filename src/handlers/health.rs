//! Informational endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to ChekwasMed API",
        "status": "running",
        "timestamp": Utc::now(),
    }))
}

/// `GET /api/test`
pub async fn test() -> Json<Value> {
    Json(json!({
        "message": "API is working",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/health`: 503 when the database does not answer
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let services = state.services.health_check().await;

    match state.database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "healthy",
                "database": "connected",
                "redis": services.redis_healthy,
                "timestamp": Utc::now(),
            })),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "unhealthy",
                    "database": "unreachable",
                    "redis": services.redis_healthy,
                    "timestamp": Utc::now(),
                })),
            )
        }
    }
}
