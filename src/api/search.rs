use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use taglist_backend::models::Record;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/search?q=... - substring search over the collection / 子串搜索
///
/// An absent or empty query returns an empty array rather than dumping
/// the whole store.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Record>> {
    let q = query.q.unwrap_or_default();
    let results = state.store.search(&q).await;

    tracing::debug!("Search {:?} matched {} record(s)", q, results.len());
    Json(results)
}
