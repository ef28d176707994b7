//! `GET /api/seal-status`, the oversight status reserved for the top rank.

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

use crate::extract::{Authorized, NationSeerOnly};

pub async fn seal_status(caller: Authorized<NationSeerOnly>) -> Json<Value> {
  let seer = caller.principal;
  tracing::info!(user_id = %seer.id, name = %seer.display_name, "seal status read");

  Json(json!({
    "seal_active": true,
    "seal_level":  seer.role,
    "user_id":     seer.id,
    "user_name":   seer.display_name,
    "timestamp":   Utc::now(),
  }))
}
