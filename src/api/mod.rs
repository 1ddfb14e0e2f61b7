pub mod records;
pub mod search;
pub mod server;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use taglist_backend::store::StoreError;

/// Map store failures onto HTTP responses / 将存储错误映射为 HTTP 响应
///
/// Validation problems are the client's to fix; everything else is a
/// server-side failure.
pub fn store_error_response(err: StoreError) -> (StatusCode, Json<Value>) {
    match err {
        StoreError::Validation(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
        }
        StoreError::Corrupt { .. } | StoreError::Io(_) => {
            tracing::error!("Store operation failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process request." })),
            )
        }
    }
}
