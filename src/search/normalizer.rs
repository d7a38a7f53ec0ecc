//! Lexical normalizer - tokenize and fold word forms / 词形归一化
//!
//! Tokens are folded to a canonical base form through a static
//! `base -> variants` table, looked up in both directions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::tokenizer::{contains_english, split_words, Tokenizer};

/// Word-form table: base form -> variant forms / 词形变化表
pub const WORD_FORMS: &[(&str, &[&str])] = &[
    ("program", &["programming", "programs", "programmed"]),
    ("learn", &["learning", "learns", "learned"]),
    ("review", &["reviews", "reviewing", "reviewed"]),
    ("make", &["makes", "making", "made"]),
    ("cook", &["cooks", "cooking", "cooked"]),
    ("phone", &["phones", "smartphone", "smartphones"]),
    ("invest", &["investment", "investing", "invested"]),
    ("educate", &["education", "educating", "educated"]),
    ("grow", &["growing", "grows", "grown"]),
    ("maintain", &["maintenance", "maintaining", "maintained"]),
    ("编程", &["编程序", "编写程序", "程序编写"]),
    ("学习", &["学到", "学会", "学习到"]),
    ("制作", &["做", "制作出", "制作成"]),
    ("评测", &["测评", "评价", "测试"]),
    ("智能手机", &["智能机", "智慧手机", "智能电话"]),
    ("最新款", &["最新型", "新款", "最新版本"]),
    ("旅游", &["旅行", "游玩", "游览"]),
    ("健康", &["保健", "养生", "康健"]),
    ("投资", &["投入", "投钱", "资本投入"]),
    ("教育", &["教导", "培育", "教养"]),
];

/// base -> variants
static FORWARD: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| WORD_FORMS.iter().copied().collect());

/// variant -> base
static REVERSE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    WORD_FORMS
        .iter()
        .flat_map(|(base, variants)| variants.iter().map(move |v| (*v, *base)))
        .collect()
});

/// Canonical base form of a token; unknown tokens pass through / 获取基础形式
pub fn base_form(token: &str) -> &str {
    if FORWARD.contains_key(token) {
        return token;
    }
    REVERSE.get(token).copied().unwrap_or(token)
}

/// Variants listed for a base form / 基础形式的全部变体
pub fn variants(base: &str) -> &'static [&'static str] {
    FORWARD.get(base).copied().unwrap_or(&[])
}

pub fn is_base_form(token: &str) -> bool {
    FORWARD.contains_key(token)
}

/// Lexical normalizer / 词法归一化器
#[derive(Clone)]
pub struct LexicalNormalizer {
    tokenizer: Arc<dyn Tokenizer>,
}

impl LexicalNormalizer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Lower-cased tokenizer words, single characters dropped unless the
    /// whole input is one character / 分词（过滤单字）
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let single_char_input = text.trim().chars().count() == 1;
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter(|t| single_char_input || t.chars().count() > 1)
            .collect()
    }

    /// Raw lower-cased tokenizer words (no length filter) / 原始分词
    pub fn raw_tokens(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Tokenize and fold to base forms / 分词并归一化
    ///
    /// English words from a whitespace split are unioned with the tokenizer
    /// stream when the text holds any ASCII letter.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let mut surface = self.tokens(text);
        if contains_english(text) {
            surface.extend(split_words(text));
        }

        let mut seen = HashSet::new();
        surface
            .iter()
            .map(|token| base_form(token).to_string())
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }
}
