//! Translation cache / 翻译缓存
//!
//! Memoizes `Translator` calls keyed by `{from}_{to}_{text}` and persists the
//! mapping as a flat JSON object. Translation fails open: any backend error or
//! timeout stores and returns the original text.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{Lang, Translator};

/// Cache counters / 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cache hits: {}, cache misses: {}", self.hits, self.misses)
    }
}

/// Build the persisted cache key / 生成缓存键
pub fn cache_key(from: Lang, to: Lang, text: &str) -> String {
    format!("{}_{}_{}", from.code(), to.code(), text)
}

pub struct TranslationCache {
    translator: Arc<dyn Translator>,
    entries: Mutex<HashMap<String, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
    /// Persistence file, `None` keeps the cache in memory only / 持久化文件
    path: Option<PathBuf>,
    timeout: Duration,
}

impl TranslationCache {
    pub fn new(translator: Arc<dyn Translator>, path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            translator,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            path,
            timeout,
        }
    }

    /// Translate through the cache (never fails) / 带缓存翻译（不会失败）
    pub async fn translate(&self, text: &str, from: Lang, to: Lang) -> String {
        if text.is_empty() {
            return String::new();
        }

        let key = cache_key(from, to, text);
        let cached = self.entries.lock().get(&key).cloned();
        if let Some(hit) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // Backend call happens without holding the map lock
        let translated = match tokio::time::timeout(
            self.timeout,
            self.translator.translate(text, from, to),
        )
        .await
        {
            Ok(Ok(translated)) => translated,
            Ok(Err(e)) => {
                tracing::warn!("Translation via {} failed, keeping original text: {}", self.translator.name(), e);
                text.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    "Translation via {} timed out after {:?}, keeping original text",
                    self.translator.name(),
                    self.timeout
                );
                text.to_string()
            }
        };

        self.entries.lock().insert(key, translated.clone());
        translated
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }

    /// Look up without touching the counters / 只读查询
    pub fn get(&self, from: Lang, to: Lang, text: &str) -> Option<String> {
        self.entries.lock().get(&cache_key(from, to, text)).cloned()
    }

    /// Copy of the whole mapping / 缓存快照
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Restore the mapping from disk / 从磁盘恢复缓存
    ///
    /// A missing or corrupt file leaves the cache empty. Returns the number of
    /// restored entries.
    pub fn load(&self) -> usize {
        let Some(path) = self.path.as_deref() else {
            return 0;
        };

        let restored = read_cache_file(path);
        let count = restored.len();
        *self.entries.lock() = restored;
        count
    }

    /// Persist the mapping, all-or-nothing / 持久化缓存（原子写入）
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let snapshot: BTreeMap<String, String> = self.entries.lock().clone().into_iter().collect();
        write_cache_file(path, &snapshot)?;
        tracing::debug!("Saved {} translation cache entries to {:?}", snapshot.len(), path);
        Ok(())
    }
}

fn read_cache_file(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        tracing::info!("No translation cache at {:?}, starting empty", path);
        return HashMap::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read translation cache {:?}: {}", path, e);
            return HashMap::new();
        }
    };

    match serde_json::from_str::<HashMap<String, String>>(&content) {
        Ok(entries) => {
            tracing::info!("Loaded {} translation cache entries from {:?}", entries.len(), path);
            entries
        }
        Err(e) => {
            tracing::warn!("Translation cache {:?} is corrupt, starting empty: {}", path, e);
            HashMap::new()
        }
    }
}

fn write_cache_file(path: &Path, entries: &BTreeMap<String, String>) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    // Write to a sibling temp file, then rename over the target
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, entries)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{IdentityTranslator, TranslateError};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Dictionary backend counting its calls
    struct DictTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for DictTranslator {
        fn name(&self) -> &'static str {
            "dict"
        }

        async fn translate(&self, text: &str, _from: Lang, _to: Lang) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text {
                "红烧肉" => Ok("braised pork".to_string()),
                _ => Err(TranslateError::EmptyResult),
            }
        }
    }

    struct SlowTranslator;

    #[async_trait]
    impl Translator for SlowTranslator {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn translate(&self, text: &str, _from: Lang, _to: Lang) -> Result<String, TranslateError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(format!("late {}", text))
        }
    }

    fn dict_cache(path: Option<PathBuf>) -> (Arc<DictTranslator>, TranslationCache) {
        let backend = Arc::new(DictTranslator { calls: AtomicUsize::new(0) });
        let cache = TranslationCache::new(backend.clone(), path, Duration::from_secs(1));
        (backend, cache)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (backend, cache) = dict_cache(None);

        assert_eq!(cache.translate("红烧肉", Lang::Zh, Lang::En).await, "braised pork");
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1, entries: 1 });

        assert_eq!(cache.translate("红烧肉", Lang::Zh, Lang::En).await, "braised pork");
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1 });
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_key_includes_direction() {
        let (backend, cache) = dict_cache(None);

        cache.translate("红烧肉", Lang::Zh, Lang::En).await;
        cache.translate("红烧肉", Lang::En, Lang::Zh).await;
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert!(cache.get(Lang::Zh, Lang::En, "红烧肉").is_some());
        assert!(cache.snapshot().contains_key("en_zh_红烧肉"));
    }

    #[tokio::test]
    async fn test_backend_error_fails_open_and_is_cached() {
        let (backend, cache) = dict_cache(None);

        assert_eq!(cache.translate("未知", Lang::Zh, Lang::En).await, "未知");
        assert_eq!(cache.translate("未知", Lang::Zh, Lang::En).await, "未知");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_open() {
        let cache = TranslationCache::new(Arc::new(IdentityTranslator), None, Duration::from_secs(1));
        assert_eq!(cache.translate("pork", Lang::En, Lang::Zh).await, "pork");
        assert_eq!(cache.get(Lang::En, Lang::Zh, "pork").as_deref(), Some("pork"));
    }

    #[tokio::test]
    async fn test_timeout_fails_open() {
        let cache = TranslationCache::new(Arc::new(SlowTranslator), None, Duration::from_millis(20));
        assert_eq!(cache.translate("红烧肉", Lang::Zh, Lang::En).await, "红烧肉");
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_not_counted() {
        let (backend, cache) = dict_cache(None);
        assert_eq!(cache.translate("", Lang::Zh, Lang::En).await, "");
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("translation_cache.json");

        let (_, cache) = dict_cache(Some(path.clone()));
        cache.translate("红烧肉", Lang::Zh, Lang::En).await;
        cache.translate("未知 文本", Lang::Zh, Lang::En).await;
        cache.save().unwrap();

        let (_, restored) = dict_cache(Some(path));
        assert_eq!(restored.load(), 2);
        assert_eq!(restored.snapshot(), cache.snapshot());
    }

    #[test]
    fn test_load_missing_or_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let (_, cache) = dict_cache(Some(path.clone()));
        assert_eq!(cache.load(), 0);

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(cache.load(), 0);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_memory_only_cache_save_is_noop() {
        let (_, cache) = dict_cache(None);
        assert!(cache.path().is_none());
        assert!(cache.save().is_ok());
    }
}
