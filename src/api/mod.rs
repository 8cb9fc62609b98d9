//! HTTP handlers: request validation and response shaping around the
//! generation, search, and update pipelines.

pub mod problems;
pub mod tasks;

use axum::Json;
use serde_json::{json, Value};

/// GET / - Liveness check.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Tasksmith API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - Health check for monitoring.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "tasksmith",
    }))
}
