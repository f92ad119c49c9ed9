use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// The `{success: true, message}` envelope used by acknowledgement
/// responses.
pub fn message_response(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

/// Wraps a payload under a named key inside the success envelope.
pub fn data_response<T: Serialize>(key: &str, data: T) -> Json<Value> {
    Json(json!({ "success": true, key: data }))
}
