use std::sync::Arc;

use bilingual_search::search::SearchEngine;
use chrono::{DateTime, Utc};

/// Shared handler state / 共享状态
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}
