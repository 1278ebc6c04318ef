use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub mod catalog;
pub mod recommend;

/// Error half of every handler result: status plus `{ "success": false, "error": .. }`.
pub type ApiError = (StatusCode, Json<Value>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
}
