use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use taglist_backend::models::Record;

use crate::state::AppState;

use super::store_error_response;

/// POST /api/add - validate and persist a new record / 校验并保存新记录
pub async fn add_record(
    State(state): State<Arc<AppState>>,
    Json(candidate): Json<Record>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let entry = state
        .store
        .append(candidate)
        .await
        .map_err(store_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "entry": entry })),
    ))
}
