use serde::{Deserialize, Serialize};

/// Rows returned by `GET /api/hot_topics` / 热点榜单条数
pub const HOT_TOPIC_LIMIT: usize = 10;

/// Upper bound for a requested `top_n` / 单次最多返回条数
pub const MAX_TOP_N: usize = 100;

/// 搜索请求
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// 索引请求
#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    pub id: u64,
    pub source_text: String,
    /// Translated on the server when absent / 缺省时由服务端翻译
    #[serde(default)]
    pub translated_text: Option<String>,
}

/// 索引结果
#[derive(Debug, Serialize)]
pub struct IndexedItem {
    pub id: u64,
    pub source_text: String,
    pub translated_text: String,
    pub document_count: usize,
}
