use axum::{extract::State, Json};
use std::sync::Arc;

use bilingual_search::search::{HistoryRecord, HotTopic};
use bilingual_search::translate::CacheStats;

use super::types::*;
use crate::api::ApiResponse;
use crate::state::AppState;

/// POST /api/index - 索引内容
pub async fn index_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndexRequest>,
) -> Json<ApiResponse<IndexedItem>> {
    if req.source_text.trim().is_empty() {
        return Json(ApiResponse::error("source_text must not be empty"));
    }

    let item = state
        .engine
        .index(req.id, &req.source_text, req.translated_text.as_deref())
        .await;
    tracing::info!("Indexed item {} via API", item.id);

    Json(ApiResponse::success(IndexedItem {
        id: item.id,
        source_text: item.source_text,
        translated_text: item.translated_text,
        document_count: state.engine.document_count(),
    }))
}

/// GET /api/hot_topics - 热点话题
pub async fn hot_topics(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<HotTopic>>> {
    Json(ApiResponse::success(state.engine.top_hot_topics(HOT_TOPIC_LIMIT)))
}

/// GET /api/history - 搜索历史，最新在前
pub async fn search_history(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<HistoryRecord>>> {
    let mut history = state.engine.search_history();
    history.reverse();
    Json(ApiResponse::success(history))
}

/// GET /api/cache/stats - 翻译缓存统计
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.engine.cache_stats()))
}
