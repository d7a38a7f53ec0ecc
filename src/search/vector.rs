//! Vector space - token vectors and cosine similarity / 向量空间
//!
//! The token table is a placeholder keyed dictionary: every vector comes from a
//! PRNG seeded with the SHA-256 of the token, so the same token always maps to
//! the same vector, in every run and process. Real embeddings can replace
//! `seeded_vector` behind the same `vectorize` contract.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use super::error::SearchError;
use super::normalizer::{base_form, is_base_form, variants};

/// Vector dimension / 向量维度
pub const VECTOR_DIM: usize = 100;

pub type Vector = Vec<f32>;

/// Tokens with a table vector / 词向量表中的词
pub const TABLE_TOKENS: &[&str] = &[
    // 中文
    "红烧肉", "制作", "编程", "手机", "评测", "学习", "如何", "美味", "家常", "智能", "家", "常",
    "入门", "教程", "最新款", "做法", "最佳", "方法", "的", "智能手机", "人工智能", "深度学习",
    "旅游", "攻略", "健康", "饮食", "重要", "性", "提高", "英语", "口语", "全球", "气候", "变化",
    "原因", "瑜伽", "股票", "投资", "基础", "知识", "选择", "电脑", "儿童", "教育", "环保", "生活",
    "小贴士", "准备", "面试", "新冠", "病毒", "预防", "措施", "电影", "推荐", "种植", "蔬菜", "汽车",
    "保养", "技巧", "语言", "排行", "榜", "缓解", "压力", "世界", "历史", "大事件", "音乐", "心理",
    "影响",
    // English
    "python", "how", "to", "make", "delicious", "braised", "pork", "programming", "tutorial",
    "latest", "smartphone", "review", "home-style", "recipe", "best", "way", "learn", "smart",
    "phone", "style", "home", "program", "artificial", "intelligence", "deep", "learning",
    "travel", "guide", "healthy", "diet", "importance", "improve", "english", "speaking", "global",
    "climate", "change", "reason", "yoga", "beginner", "stock", "investment", "basic", "knowledge",
    "choose", "laptop", "child", "education", "method", "eco-friendly", "living", "tips",
    "prepare", "interview", "covid-19", "prevention", "measures", "movie", "recommendation",
    "grow", "vegetables", "car", "maintenance", "language", "ranking", "relieve", "stress",
    "world", "history", "event", "music", "mental", "health", "effect",
];

const TABLE_DOMAIN: &str = "table";
const FALLBACK_DOMAIN: &str = "fallback";

/// Deterministic pseudo-random vector for a token / 确定性伪随机向量
pub fn seeded_vector(domain: &str, token: &str, dim: usize) -> Vector {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([0u8]);
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(seed));
    (0..dim).map(|_| rng.gen::<f32>()).collect()
}

/// Element-wise mean, `None` when empty / 逐元素平均
pub fn mean(vectors: &[Vector], dim: usize) -> Option<Vector> {
    if vectors.is_empty() {
        return None;
    }
    let mut sum = vec![0.0f32; dim];
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v.iter()) {
            *acc += x;
        }
    }
    let n = vectors.len() as f32;
    Some(sum.into_iter().map(|x| x / n).collect())
}

/// Cosine similarity; zero vectors score 0 / 余弦相似度
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32, SearchError> {
    if a.len() != b.len() {
        return Err(SearchError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Who is asking for a vector / 向量化场景
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorMode {
    /// Indexing skips unknown tokens / 索引时跳过未知词
    Index,
    /// Query processing gives unknown tokens a fallback vector / 查询时未知词使用兜底向量
    Query,
}

pub struct VectorSpace {
    dim: usize,
    table: BTreeMap<String, Vector>,
    /// Memoized fallback vectors, only read by query processing / 兜底向量缓存
    fallback: RwLock<HashMap<String, Vector>>,
}

impl VectorSpace {
    pub fn new() -> Self {
        Self::with_tokens(TABLE_TOKENS.iter().copied(), VECTOR_DIM)
    }

    pub fn with_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>, dim: usize) -> Self {
        let table = tokens
            .into_iter()
            .map(|t| (t.to_string(), seeded_vector(TABLE_DOMAIN, t, dim)))
            .collect();
        Self {
            dim,
            table,
            fallback: RwLock::new(HashMap::new()),
        }
    }

    pub fn zero(&self) -> Vector {
        vec![0.0; self.dim]
    }

    /// Table vector, or the mean of a base form's variants / 查表或变体平均
    pub fn resolve(&self, token: &str) -> Option<Vector> {
        if let Some(v) = self.table.get(token) {
            return Some(v.clone());
        }
        if is_base_form(token) {
            let forms: Vec<Vector> = variants(token)
                .iter()
                .filter_map(|form| self.table.get(*form).cloned())
                .collect();
            return mean(&forms, self.dim);
        }
        None
    }

    /// Deterministic vector for an unknown token / 未知词兜底向量
    pub fn fallback(&self, token: &str) -> Vector {
        if let Some(v) = self.fallback.read().get(token) {
            return v.clone();
        }
        let v = seeded_vector(FALLBACK_DOMAIN, token, self.dim);
        self.fallback.write().entry(token.to_string()).or_insert(v).clone()
    }

    /// Average the resolved vectors of normalized tokens / 文本向量
    pub fn vectorize(&self, tokens: &[String], mode: VectorMode) -> Vector {
        let resolved: Vec<Vector> = tokens
            .iter()
            .filter_map(|token| match (self.resolve(token), mode) {
                (Some(v), _) => Some(v),
                (None, VectorMode::Query) => Some(self.fallback(token)),
                (None, VectorMode::Index) => None,
            })
            .collect();
        mean(&resolved, self.dim).unwrap_or_else(|| self.zero())
    }

    /// Vector for a query shorter than three characters / 短查询向量
    ///
    /// Collects words containing the query (vocabulary first, then the vector
    /// table), expands them through the word-form table and averages their
    /// vectors. `None` when nothing contains the query.
    pub fn short_query_vector<'a>(
        &self,
        query: &str,
        vocabulary: impl IntoIterator<Item = &'a String>,
    ) -> Option<Vector> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let mut matches: Vec<String> = vocabulary
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| w.contains(&needle))
            .collect();
        if matches.is_empty() {
            matches = self
                .table
                .keys()
                .filter(|w| w.contains(&needle))
                .cloned()
                .collect();
        }
        if matches.is_empty() {
            return None;
        }

        let mut expanded = BTreeSet::new();
        for word in &matches {
            let base = base_form(word);
            expanded.insert(base.to_string());
            expanded.extend(variants(base).iter().map(|v| v.to_string()));
        }

        let vectors: Vec<Vector> = expanded
            .iter()
            .map(|word| self.resolve(word).unwrap_or_else(|| self.fallback(word)))
            .collect();
        mean(&vectors, self.dim)
    }
}

impl Default for VectorSpace {
    fn default() -> Self {
        Self::new()
    }
}
