//! Search engine - bilingual in-memory retrieval / 双语搜索引擎
//!
//! Owns every piece of state: items, vocabulary, translation cache, hot topics
//! and history. Shared as `Arc<SearchEngine>`; no lock is held across `.await`.
//!
//! - index: translate (when needed), tokenize, vectorize, store / 索引
//! - search: detect language, translate, score, rank, record / 搜索

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::SearchError;
use super::history::SearchHistoryLog;
use super::hot_topics::{HotTopicSettings, HotTopicTracker};
use super::normalizer::LexicalNormalizer;
use super::schema::{ContentItem, HistoryRecord, HotTopic, SearchHit, SearchOutcome, SearchResponse};
use super::scoring::{self, QueryContext};
use super::tokenizer::Tokenizer;
use super::vector::{Vector, VectorMode, VectorSpace};
use crate::translate::{CacheStats, Lang, TranslationCache};

/// Suggestion attached to every failed search / 搜索失败提示
pub const FAILURE_SUGGESTION: &str = "Check the query text and try again";

/// Queries with fewer characters take the short-query path / 短查询阈值
const SHORT_QUERY_CHARS: usize = 3;

/// Engine settings / 引擎设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Result count when the caller gives none / 默认返回条数
    pub default_top_n: usize,
    pub hot_topics: HotTopicSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_top_n: 5,
            hot_topics: HotTopicSettings::default(),
        }
    }
}

pub struct SearchEngine {
    settings: EngineSettings,
    cache: Arc<TranslationCache>,
    normalizer: LexicalNormalizer,
    vectors: VectorSpace,
    /// id -> item
    items: RwLock<BTreeMap<u64, ContentItem>>,
    /// Every word seen at index time / 词汇表
    vocabulary: RwLock<BTreeSet<String>>,
    hot_topics: Arc<HotTopicTracker>,
    history: SearchHistoryLog,
    cancel: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    /// Cache already written by `shutdown` / 缓存是否已保存
    persisted: AtomicBool,
}

impl SearchEngine {
    /// Create the engine and start the hot topic sweeper / 创建引擎并启动热点清理
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(settings: EngineSettings, cache: Arc<TranslationCache>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        let hot_topics = Arc::new(HotTopicTracker::new(settings.hot_topics));
        let cancel = CancellationToken::new();
        let sweeper = hot_topics.spawn_sweeper(cancel.clone());

        Self {
            settings,
            cache,
            normalizer: LexicalNormalizer::new(tokenizer),
            vectors: VectorSpace::new(),
            items: RwLock::new(BTreeMap::new()),
            vocabulary: RwLock::new(BTreeSet::new()),
            hot_topics,
            history: SearchHistoryLog::new(),
            cancel,
            sweeper: Mutex::new(Some(sweeper)),
            persisted: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Index one item, replacing any item with the same id / 索引内容
    ///
    /// Without a translation the source text is translated zh -> en through
    /// the cache.
    pub async fn index(&self, id: u64, source_text: &str, translated_text: Option<&str>) -> ContentItem {
        let translated = match translated_text {
            Some(text) => text.to_string(),
            None => self.cache.translate(source_text, Lang::Zh, Lang::En).await,
        };

        let item = ContentItem::new(id, source_text, translated, &self.normalizer, &self.vectors);

        let replaced = {
            let mut items = self.items.write();
            let replaced = items.insert(id, item.clone()).is_some();

            let mut vocabulary = self.vocabulary.write();
            if replaced {
                // Words of the old item may be gone
                vocabulary.clear();
                for existing in items.values() {
                    extend_vocabulary(&mut vocabulary, existing);
                }
            } else {
                extend_vocabulary(&mut vocabulary, &item);
            }
            replaced
        };

        if replaced {
            debug!("Re-indexed item {}", id);
        } else {
            debug!("Indexed item {}: {}", id, item.source_text);
        }
        item
    }

    /// Search; never fails, failures come back as data / 搜索
    pub async fn search(&self, query: &str, top_n: usize) -> SearchOutcome {
        let started = Instant::now();

        if query.trim().is_empty() {
            self.history.record(query, "", Utc::now(), false);
            self.hot_topics.record(query);
            return SearchOutcome::Success(SearchResponse {
                query: query.to_string(),
                translated_query: String::new(),
                results: Vec::new(),
                cache_stats: self.cache.stats(),
                elapsed_seconds: started.elapsed().as_secs_f64(),
            });
        }

        let lang = Lang::detect(query);
        let translated = self.cache.translate(query, lang, lang.opposite()).await;

        let outcome = match self.rank_items(query, &translated, lang, top_n) {
            Ok(results) => SearchOutcome::Success(SearchResponse {
                query: query.to_string(),
                translated_query: translated.clone(),
                results,
                cache_stats: self.cache.stats(),
                elapsed_seconds: started.elapsed().as_secs_f64(),
            }),
            Err(e) => {
                warn!("Search for {:?} failed: {}", query, e);
                SearchOutcome::Failure {
                    error: e.to_string(),
                    suggestion: FAILURE_SUGGESTION.to_string(),
                }
            }
        };

        let found = !outcome.results().is_empty();
        self.history.record(query, translated, Utc::now(), found);
        self.hot_topics.record(query);
        debug!("Search {:?} ({}) -> {} results", query, lang, outcome.results().len());
        outcome
    }

    /// Everything synchronous in a search, with panics turned into errors
    fn rank_items(&self, query: &str, translated: &str, lang: Lang, top_n: usize) -> Result<Vec<SearchHit>, SearchError> {
        let items = self.items.read();

        let ranked = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Vec<SearchHit>, SearchError> {
            let vector = self.query_vector(query, translated);
            let ctx = QueryContext::new(query, lang, vector, &self.normalizer);

            let scored = items
                .values()
                .map(|item| scoring::score(&ctx, item))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(scoring::rank(scored, top_n)
                .into_iter()
                .filter_map(|s| {
                    let item = items.get(&s.id)?;
                    let match_label = s
                        .tier
                        .label()
                        .map(str::to_string)
                        .unwrap_or_else(|| s.source.to_string());
                    Some(SearchHit {
                        id: s.id,
                        source_text: item.source_text.clone(),
                        translated_text: item.translated_text.clone(),
                        score: round4(s.score),
                        tier: s.tier,
                        match_source: s.source,
                        match_label,
                    })
                })
                .collect())
        }))
        .map_err(|payload| SearchError::Internal(panic_message(&*payload)))??;

        Ok(ranked)
    }

    /// Query vector: short-query expansion, else query + translation / 查询向量
    fn query_vector(&self, query: &str, translated: &str) -> Vector {
        if query.chars().count() < SHORT_QUERY_CHARS {
            let vocabulary = self.vocabulary.read();
            if let Some(vector) = self.vectors.short_query_vector(query, vocabulary.iter()) {
                return vector;
            }
            return self.vectors.vectorize(&self.normalizer.normalize(query), VectorMode::Query);
        }

        let combined = format!("{} {}", query, translated);
        self.vectors.vectorize(&self.normalizer.normalize(&combined), VectorMode::Query)
    }

    /// Counts of every tracked query / 热点计数
    pub fn hot_topics(&self) -> HashMap<String, u32> {
        self.hot_topics.snapshot()
    }

    pub fn top_hot_topics(&self, n: usize) -> Vec<HotTopic> {
        self.hot_topics.top(n)
    }

    pub fn search_history(&self) -> Vec<HistoryRecord> {
        self.history.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn document_count(&self) -> usize {
        self.items.read().len()
    }

    pub fn get(&self, id: u64) -> Option<ContentItem> {
        self.items.read().get(&id).cloned()
    }

    pub fn vocabulary(&self) -> Vec<String> {
        self.vocabulary.read().iter().cloned().collect()
    }

    /// Stop the sweeper and persist the translation cache / 关闭引擎
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Hot topic sweeper ended abnormally: {}", e);
            }
        }
        self.persist_cache();
        info!("Search engine shut down");
    }

    fn persist_cache(&self) {
        if self.persisted.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.cache.save() {
            warn!("Failed to save translation cache: {}", e);
        }
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.persist_cache();
    }
}

fn extend_vocabulary(vocabulary: &mut BTreeSet<String>, item: &ContentItem) {
    vocabulary.extend(item.translated_tokens.iter().cloned());
    vocabulary.extend(item.source_tokens.iter().cloned());
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scoring panicked".to_string()
    }
}
