//! Search history / 搜索历史
//!
//! Append-only, in memory, one record per `search` call.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::schema::HistoryRecord;

#[derive(Default)]
pub struct SearchHistoryLog {
    records: Mutex<Vec<HistoryRecord>>,
}

impl SearchHistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        query: impl Into<String>,
        translated_query: impl Into<String>,
        timestamp: DateTime<Utc>,
        found: bool,
    ) {
        self.records.lock().push(HistoryRecord {
            query: query.into(),
            translated_query: translated_query.into(),
            timestamp,
            found,
        });
    }

    /// Copy in insertion order / 按插入顺序复制
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_insertion_order_and_no_dedup() {
        let log = SearchHistoryLog::new();
        let t0 = Utc::now();
        log.record("红烧肉", "braised pork", t0, true);
        log.record("红烧肉", "braised pork", t0 + Duration::seconds(1), true);
        log.record("zzz", "zzz", t0 + Duration::seconds(2), false);

        let records = log.snapshot();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].timestamp, t0);
        assert_eq!(records[1].query, "红烧肉");
        assert!(!records[2].found);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let log = SearchHistoryLog::new();
        assert!(log.is_empty());
        log.record("python", "Python", Utc::now(), true);
        let before = log.snapshot();
        log.record("yoga", "瑜伽", Utc::now(), true);
        assert_eq!(before.len(), 1);
        assert_eq!(log.snapshot().len(), 2);
    }
}
