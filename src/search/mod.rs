//! Search module - bilingual retrieval over an in-memory corpus / 搜索模块
//!
//! Layers, leaves first / 分层：
//! - tokenizer, normalizer: jieba tokens folded to base forms
//! - vector, substring: per-item vectors and partial match sets
//! - scoring: cosine plus priority tiers, final ordering
//! - hot_topics, history: query bookkeeping
//! - engine: orchestration

pub mod engine;
pub mod error;
pub mod history;
pub mod hot_topics;
pub mod normalizer;
pub mod schema;
pub mod scoring;
pub mod substring;
pub mod tokenizer;
pub mod vector;

pub use engine::{EngineSettings, SearchEngine, FAILURE_SUGGESTION};
pub use error::SearchError;
pub use hot_topics::{HotTopicSettings, HotTopicTracker};
pub use normalizer::LexicalNormalizer;
pub use schema::{ContentItem, HistoryRecord, HotTopic, MatchSource, MatchTier, SearchHit, SearchOutcome, SearchResponse};
pub use tokenizer::{JiebaTokenizer, Tokenizer};
pub use vector::VectorSpace;
