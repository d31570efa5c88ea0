pub mod auth;
pub mod bids;
pub mod deliverables;
pub mod extract;
pub mod projects;
pub mod reviews;

use crate::error::AppError;
use axum::Json;
use serde_json::{json, Value};

pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn handle_not_found() -> AppError {
    AppError::not_found("Route not found")
}
