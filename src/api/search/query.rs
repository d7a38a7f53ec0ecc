use axum::{extract::State, Json};
use std::sync::Arc;

use bilingual_search::search::SearchOutcome;

use super::types::*;
use crate::api::ApiResponse;
use crate::state::AppState;

/// POST /api/search
///
/// Failed searches still answer 200; the outcome carries `success: false`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<ApiResponse<SearchOutcome>> {
    let top_n = req
        .top_n
        .unwrap_or_else(|| state.engine.settings().default_top_n)
        .min(MAX_TOP_N);

    let outcome = state.engine.search(&req.query, top_n).await;
    Json(ApiResponse::success(outcome))
}
