//! Unauthenticated service endpoints.

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// `GET /health`
pub async fn health() -> Json<Value> {
  Json(json!({
    "status":    "healthy",
    "service":   "CHURCHOS API",
    "timestamp": Utc::now(),
  }))
}

/// `GET /api`
pub async fn api_info() -> Json<Value> {
  Json(json!({
    "title":       "CHURCHOS API",
    "description": "Role-gated backend for church governance",
    "version":     env!("CARGO_PKG_VERSION"),
  }))
}
