//! Built-in sample corpus / 示例内容

use std::time::Duration;

use crate::search::SearchEngine;

/// (id, Chinese source text) / 示例内容
pub const SAMPLE_CONTENTS: &[(u64, &str)] = &[
    (1, "如何制作美味的红烧肉"),
    (2, "Python编程入门教程"),
    (3, "最新款智能手机评测"),
    (4, "家常红烧肉的做法"),
    (5, "学习Python的最佳方法"),
    (6, "什么是人工智能"),
    (7, "如何学习深度学习"),
    (8, "北京旅游攻略"),
    (9, "健康饮食的重要性"),
    (10, "如何提高英语口语"),
    (11, "全球气候变化的原因"),
    (12, "瑜伽入门指南"),
    (13, "股票投资基础知识"),
    (14, "如何选择笔记本电脑"),
    (15, "儿童教育方法"),
    (16, "环保生活小贴士"),
    (17, "如何准备面试"),
    (18, "新冠病毒预防措施"),
    (19, "2023年热门电影推荐"),
    (20, "如何在家种植蔬菜"),
    (21, "汽车保养技巧大全"),
    (22, "编程语言排行榜"),
    (23, "如何缓解工作压力"),
    (24, "世界历史大事件"),
    (25, "音乐对心理健康的影响"),
];

/// Index every sample, translating through the engine's cache / 索引示例内容
///
/// `pace` is slept between items that were not already cached, to stay under
/// the translation API's rate limit. Returns the number of indexed items.
pub async fn index_samples(engine: &SearchEngine, pace: Duration) -> usize {
    for (i, (id, source)) in SAMPLE_CONTENTS.iter().enumerate() {
        let misses = engine.cache_stats().misses;
        engine.index(*id, source, None).await;

        let translated_online = engine.cache_stats().misses > misses;
        if translated_online && !pace.is_zero() && i + 1 < SAMPLE_CONTENTS.len() {
            tokio::time::sleep(pace).await;
        }
    }
    tracing::info!("Indexed {} sample items", SAMPLE_CONTENTS.len());
    SAMPLE_CONTENTS.len()
}
