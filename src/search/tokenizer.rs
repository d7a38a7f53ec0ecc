//! Tokenizer - uses jieba-rs for Chinese word segmentation / 分词器
//!
//! Supports / 支持：
//! - Chinese word segmentation (jieba, HMM on) / 中文分词
//! - Domain compounds kept whole through a custom dictionary / 自定义词典
//! - English words pass through as jieba tokens / 英文单词原样输出

use jieba_rs::Jieba;
use once_cell::sync::Lazy;

/// Compounds that must never be split / 不应被拆分的复合词
pub const CUSTOM_WORDS: &[&str] = &[
    "智能手机", "最新款", "红烧肉", "入门教程", "Python编程", "人工智能", "深度学习",
    "气候变化", "健康饮食", "英语口语", "股票投资", "笔记本电脑", "儿童教育", "环保生活",
    "面试准备", "新冠病毒", "电影推荐", "种植蔬菜", "汽车保养", "编程语言", "缓解压力",
    "世界历史", "心理健康",
];

/// Global jieba instance with the custom dictionary / 全局 jieba 实例
static JIEBA: Lazy<Jieba> = Lazy::new(|| {
    let mut jieba = Jieba::new();
    for word in CUSTOM_WORDS {
        jieba.add_word(word, None, None);
    }
    jieba
});

/// External tokenizer capability / 分词能力
///
/// Must be deterministic for identical input.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// jieba backed tokenizer / jieba 分词器
#[derive(Debug, Default, Clone, Copy)]
pub struct JiebaTokenizer;

impl Tokenizer for JiebaTokenizer {
    /// Raw jieba tokens, whitespace dropped, case preserved / 原始分词结果
    fn tokenize(&self, text: &str) -> Vec<String> {
        JIEBA
            .cut(text, true)
            .into_iter()
            .filter(|word| !word.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Check if text contains ASCII letters / 检测文本是否包含英文字母
pub fn contains_english(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// Lower-cased whitespace split / 按空白切分并转小写
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
