//! Hot topic tracker / 热点话题
//!
//! A query becomes hot on its `threshold`-th hit. Its expiry is fixed at that
//! moment and is never extended; once it passes, the sweeper drops the query
//! entirely, count included, and it has to earn its way back from zero.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::schema::HotTopic;

/// Tracker settings / 热点设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotTopicSettings {
    /// Hits needed for promotion / 晋升所需次数
    pub threshold: u32,
    /// Lifetime of a promotion / 热点有效期
    pub ttl: Duration,
    /// Sweeper period / 清理间隔
    pub sweep_interval: Duration,
}

impl Default for HotTopicSettings {
    fn default() -> Self {
        Self {
            threshold: 5,
            ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Promotion {
    promoted_at: Instant,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct TrackerState {
    counts: HashMap<String, u32>,
    promotions: HashMap<String, Promotion>,
}

pub struct HotTopicTracker {
    settings: HotTopicSettings,
    state: Mutex<TrackerState>,
}

impl HotTopicTracker {
    pub fn new(settings: HotTopicSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(TrackerState::default()),
        }
    }

    pub fn settings(&self) -> HotTopicSettings {
        self.settings
    }

    /// Count one hit of `query` / 记录一次搜索
    pub fn record(&self, query: &str) -> u32 {
        self.record_at(query, Instant::now())
    }

    /// Count one hit at a given instant, returns the new count
    pub fn record_at(&self, query: &str, now: Instant) -> u32 {
        let mut state = self.state.lock();
        let count = {
            let count = state.counts.entry(query.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if count >= self.settings.threshold && !state.promotions.contains_key(query) {
            state.promotions.insert(
                query.to_string(),
                Promotion {
                    promoted_at: now,
                    expires_at: now + self.settings.ttl,
                },
            );
            debug!("Hot topic promoted: {} ({} hits)", query, count);
        }
        count
    }

    /// Drop every promotion that has expired, returns how many went / 清理过期热点
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        let expired: Vec<String> = state
            .promotions
            .iter()
            .filter(|(_, p)| now > p.expires_at)
            .map(|(query, _)| query.clone())
            .collect();

        for query in &expired {
            state.promotions.remove(query);
            state.counts.remove(query);
        }
        expired.len()
    }

    /// All current counts / 当前计数快照
    pub fn snapshot(&self) -> HashMap<String, u32> {
        self.state.lock().counts.clone()
    }

    pub fn is_promoted(&self, query: &str) -> bool {
        self.state.lock().promotions.contains_key(query)
    }

    pub fn promoted_at(&self, query: &str) -> Option<Instant> {
        self.state.lock().promotions.get(query).map(|p| p.promoted_at)
    }

    pub fn expires_at(&self, query: &str) -> Option<Instant> {
        self.state.lock().promotions.get(query).map(|p| p.expires_at)
    }

    /// Leaderboard: count desc, then query asc / 热点排行
    pub fn top(&self, n: usize) -> Vec<HotTopic> {
        let mut topics: Vec<HotTopic> = self
            .snapshot()
            .into_iter()
            .map(|(query, count)| HotTopic { query, count })
            .collect();
        topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        topics.truncate(n);
        topics
    }

    /// Spawn the periodic sweeper; it exits when `cancel` fires / 启动后台清理任务
    pub fn spawn_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let tracker = Arc::clone(self);
        let period = self.settings.sweep_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = tracker.sweep();
                        if removed > 0 {
                            debug!("Swept {} expired hot topics", removed);
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("Hot topic sweeper stopped");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for HotTopicTracker {
    fn default() -> Self {
        Self::new(HotTopicSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promoted_exactly_once_at_threshold() {
        let tracker = HotTopicTracker::default();
        let t0 = Instant::now();

        for i in 0..4 {
            tracker.record_at("红烧肉", t0 + Duration::from_secs(i));
            assert!(!tracker.is_promoted("红烧肉"));
        }
        tracker.record_at("红烧肉", t0 + Duration::from_secs(4));
        assert!(tracker.is_promoted("红烧肉"));
        assert_eq!(tracker.promoted_at("红烧肉"), Some(t0 + Duration::from_secs(4)));
        let expiry = tracker.expires_at("红烧肉").unwrap();
        assert_eq!(expiry, t0 + Duration::from_secs(4) + Duration::from_secs(300));

        // further hits keep counting but do not move the expiry
        tracker.record_at("红烧肉", t0 + Duration::from_secs(100));
        assert_eq!(tracker.expires_at("红烧肉"), Some(expiry));
        assert_eq!(tracker.snapshot()["红烧肉"], 6);
    }

    #[test]
    fn test_sweep_removes_count_and_expiry() {
        let tracker = HotTopicTracker::default();
        let t0 = Instant::now();
        for _ in 0..5 {
            tracker.record_at("python", t0);
        }
        tracker.record_at("pork", t0);

        assert_eq!(tracker.sweep_at(t0 + Duration::from_secs(300)), 0);
        assert_eq!(tracker.sweep_at(t0 + Duration::from_secs(301)), 1);

        let snapshot = tracker.snapshot();
        assert!(!snapshot.contains_key("python"));
        assert_eq!(snapshot["pork"], 1);
        assert!(!tracker.is_promoted("python"));
    }

    #[test]
    fn test_repromotion_needs_fresh_hits() {
        let tracker = HotTopicTracker::default();
        let t0 = Instant::now();
        for _ in 0..5 {
            tracker.record_at("yoga", t0);
        }
        tracker.sweep_at(t0 + Duration::from_secs(400));

        let t1 = t0 + Duration::from_secs(500);
        for _ in 0..4 {
            tracker.record_at("yoga", t1);
        }
        assert!(!tracker.is_promoted("yoga"));
        tracker.record_at("yoga", t1);
        assert_eq!(tracker.expires_at("yoga"), Some(t1 + Duration::from_secs(300)));
    }

    #[test]
    fn test_top_orders_by_count_then_query() {
        let tracker = HotTopicTracker::default();
        for (query, hits) in [("b", 3), ("a", 3), ("c", 7), ("d", 1)] {
            for _ in 0..hits {
                tracker.record(query);
            }
        }
        let top = tracker.top(3);
        let queries: Vec<&str> = top.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(queries, vec!["c", "a", "b"]);
        assert_eq!(top[0].count, 7);
    }

    #[tokio::test]
    async fn test_sweeper_task_expires_and_stops() {
        let tracker = Arc::new(HotTopicTracker::new(HotTopicSettings {
            threshold: 2,
            ttl: Duration::from_millis(30),
            sweep_interval: Duration::from_millis(10),
        }));
        let cancel = CancellationToken::new();
        let handle = tracker.spawn_sweeper(cancel.clone());

        tracker.record("深度学习");
        tracker.record("深度学习");
        assert!(tracker.is_promoted("深度学习"));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(tracker.snapshot().is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }
}
