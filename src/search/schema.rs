//! Search data model / 搜索数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::normalizer::LexicalNormalizer;
use super::substring::SubstringIndex;
use super::tokenizer::split_words;
use super::vector::{Vector, VectorMode, VectorSpace};
use crate::translate::{CacheStats, Lang};

/// Indexed content item / 已索引内容
///
/// Built once by `SearchEngine::index`; a re-index with the same id replaces
/// the whole item.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: u64,
    /// Chinese source text / 中文原文
    pub source_text: String,
    /// English translation / 英文译文
    pub translated_text: String,
    /// `"{source} {translated}"`
    pub combined_text: String,
    /// Tokenizer words of the source text / 原文分词
    pub source_tokens: Vec<String>,
    /// Lower-cased whitespace words of the translation / 译文单词
    pub translated_tokens: Vec<String>,
    pub substrings: SubstringIndex,
    /// Vector of the combined text / 合并文本向量
    pub vector: Vector,
}

impl ContentItem {
    /// Tokenize, build partial-match sets and vectorize / 构建索引内容
    pub fn new(
        id: u64,
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        normalizer: &LexicalNormalizer,
        vectors: &VectorSpace,
    ) -> Self {
        let source_text = source_text.into();
        let translated_text = translated_text.into();
        let combined_text = format!("{} {}", source_text, translated_text);

        let source_tokens = normalizer.raw_tokens(&source_text);
        let translated_tokens = split_words(&translated_text);
        let substrings = SubstringIndex::build(&source_tokens, &translated_tokens);
        let vector = vectors.vectorize(&normalizer.normalize(&combined_text), VectorMode::Index);

        Self {
            id,
            source_text,
            translated_text,
            combined_text,
            source_tokens,
            translated_tokens,
            substrings,
            vector,
        }
    }

    /// Text of the item in the given language / 指定语言的文本
    pub fn text(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.translated_text,
            Lang::Zh => &self.source_text,
        }
    }
}

/// Priority tier of a match; higher tiers always rank first / 匹配优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Baseline cosine only / 仅向量相似度
    None,
    /// Query letters found in any order / 乱序子集匹配
    UnorderedSubset,
    /// Query found as an ordered substring / 顺序子串匹配
    OrderedSubstring,
    /// Single letter occurs inside an English word / 单字母包含
    LetterContained,
    /// Single letter starts a later English word / 单字母为其他单词首字母
    WordInitial,
    /// Single letter starts the first English word / 单字母为首词首字母
    LeadingLetter,
}

impl MatchTier {
    /// Additive offset; consecutive tiers differ by more than the cosine range
    pub fn boost(&self) -> f64 {
        match self {
            MatchTier::None => 0.0,
            MatchTier::UnorderedSubset => 1.0,
            MatchTier::OrderedSubstring => 10.0,
            MatchTier::LetterContained => 100.0,
            MatchTier::WordInitial => 1000.0,
            MatchTier::LeadingLetter => 10000.0,
        }
    }

    /// Result label of a boosted tier, `None` for the baseline / 优先级描述
    pub fn label(&self) -> Option<&'static str> {
        match self {
            MatchTier::None => None,
            MatchTier::UnorderedSubset => Some("unordered subset match"),
            MatchTier::OrderedSubstring => Some("ordered substring match"),
            MatchTier::LetterContained => Some("letter contained in the English text"),
            MatchTier::WordInitial => Some("initial letter of a later English word"),
            MatchTier::LeadingLetter => Some("initial letter of the English text"),
        }
    }
}

/// Why an item matched, independent of its tier / 匹配来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchSource {
    /// Query found verbatim in the text of its own language / 查询语言原文匹配
    QueryLanguage { lang: Lang },
    /// Query found verbatim in the text of the other language / 对侧语言匹配
    OtherLanguage { lang: Lang },
    /// Query folded to a base form that occurs in the item / 词形变化匹配
    WordForm { lang: Lang, from: String, base: String },
    /// One Chinese character found in the source text / 中文单字匹配
    SingleCharacter,
    /// Vector similarity only / 模糊匹配
    Fuzzy,
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchSource::QueryLanguage { lang } => write!(f, "exact match in query language ({})", lang),
            MatchSource::OtherLanguage { lang } => write!(f, "exact match in translated language ({})", lang),
            MatchSource::WordForm { lang, from, base } => {
                write!(f, "word form match in {} ({} -> {})", lang, from, base)
            }
            MatchSource::SingleCharacter => f.write_str("single character match"),
            MatchSource::Fuzzy => f.write_str("fuzzy match"),
        }
    }
}

/// One ranked result / 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,
    pub source_text: String,
    pub translated_text: String,
    /// Cosine plus tier boost, rounded to 4 decimals / 分数
    pub score: f64,
    pub tier: MatchTier,
    pub match_source: MatchSource,
    /// Human readable `match_source` / 匹配来源描述
    pub match_label: String,
}

/// Successful search / 搜索成功结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub translated_query: String,
    pub results: Vec<SearchHit>,
    pub cache_stats: CacheStats,
    pub elapsed_seconds: f64,
}

/// Result of `SearchEngine::search`; failures are data, not errors / 搜索结果
///
/// Serialized flat with a boolean `success` field.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Success(SearchResponse),
    Failure { error: String, suggestion: String },
}

impl Serialize for SearchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Success<'a> {
            success: bool,
            #[serde(flatten)]
            response: &'a SearchResponse,
        }

        #[derive(Serialize)]
        struct Failure<'a> {
            success: bool,
            error: &'a str,
            suggestion: &'a str,
        }

        match self {
            SearchOutcome::Success(response) => Success { success: true, response }.serialize(serializer),
            SearchOutcome::Failure { error, suggestion } => Failure {
                success: false,
                error,
                suggestion,
            }
            .serialize(serializer),
        }
    }
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchOutcome::Success(_))
    }

    pub fn results(&self) -> &[SearchHit] {
        match self {
            SearchOutcome::Success(resp) => &resp.results,
            SearchOutcome::Failure { .. } => &[],
        }
    }
}

/// One executed search / 搜索历史记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub query: String,
    pub translated_query: String,
    pub timestamp: DateTime<Utc>,
    pub found: bool,
}

/// Hot topic leaderboard row / 热点条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotTopic {
    pub query: String,
    pub count: u32,
}
