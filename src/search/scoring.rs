//! Scoring - cosine similarity plus priority tiers / 评分
//!
//! Tier evaluation is an ordered chain of pure functions; the first one that
//! returns a tier wins. The tier boost is added to the baseline cosine so that
//! the combined score alone reproduces the tier ordering.

use std::cmp::Ordering;

use super::error::SearchError;
use super::normalizer::{base_form, LexicalNormalizer};
use super::schema::{ContentItem, MatchSource, MatchTier};
use super::tokenizer::split_words;
use super::vector::{cosine, Vector};
use crate::translate::Lang;

/// Everything derived from a query once, before scanning the items / 查询上下文
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Trimmed, lower-cased query / 归一化查询
    pub text: String,
    pub lang: Lang,
    pub vector: Vector,
    /// Tokenizer words, checked against the Chinese text / 分词结果
    pub zh_tokens: Vec<String>,
    /// Whitespace words, checked against the English text / 空格切分结果
    pub en_tokens: Vec<String>,
}

impl QueryContext {
    pub fn new(query: &str, lang: Lang, vector: Vector, normalizer: &LexicalNormalizer) -> Self {
        let text = query.trim().to_lowercase();
        Self {
            zh_tokens: normalizer.tokens(&text),
            en_tokens: split_words(&text),
            text,
            lang,
            vector,
        }
    }

    /// The query as one ASCII letter, if it is one / 单个英文字母查询
    fn single_letter(&self) -> Option<char> {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
            _ => None,
        }
    }
}

/// Score of one item / 单条评分
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub id: u64,
    /// Baseline cosine similarity / 基础相似度
    pub cosine: f64,
    /// `cosine + tier.boost()`
    pub score: f64,
    pub tier: MatchTier,
    pub source: MatchSource,
}

type TierFn = fn(&QueryContext, &ContentItem) -> Option<MatchTier>;

/// Tier checks in priority order / 优先级链
const TIER_CHAIN: &[TierFn] = &[single_letter_tier, substring_tier];

/// Single ASCII letter against the English words / 单字母优先
pub fn single_letter_tier(query: &QueryContext, item: &ContentItem) -> Option<MatchTier> {
    let letter = query.single_letter()?;
    let words = &item.translated_tokens;

    if words.first().is_some_and(|w| w.starts_with(letter)) {
        return Some(MatchTier::LeadingLetter);
    }
    if words.iter().skip(1).any(|w| w.starts_with(letter)) {
        return Some(MatchTier::WordInitial);
    }
    if words.iter().any(|w| w.contains(letter)) {
        return Some(MatchTier::LetterContained);
    }
    None
}

/// Ordered substring (2 points) beats unordered subset (1 point), summed
/// over query tokens and both languages / 子串优先级
pub fn substring_points(query: &QueryContext, item: &ContentItem) -> u32 {
    let zh_text = item.source_text.to_lowercase();
    let en_text = item.translated_text.to_lowercase();

    let zh: u32 = query
        .zh_tokens
        .iter()
        .map(|token| {
            let forms = surface_and_base(token);
            if forms.iter().any(|f| zh_text.contains(f.as_str())) {
                2
            } else if forms.iter().any(|f| item.substrings.shares_substring(f)) {
                1
            } else {
                0
            }
        })
        .sum();

    let en: u32 = query
        .en_tokens
        .iter()
        .map(|token| {
            let forms = surface_and_base(token);
            if forms.iter().any(|f| en_text.contains(f.as_str())) {
                2
            } else if forms.iter().any(|f| item.substrings.contains_letters(f)) {
                1
            } else {
                0
            }
        })
        .sum();

    zh + en
}

pub fn substring_tier(query: &QueryContext, item: &ContentItem) -> Option<MatchTier> {
    match substring_points(query, item) {
        0 => None,
        1 => Some(MatchTier::UnorderedSubset),
        _ => Some(MatchTier::OrderedSubstring),
    }
}

fn surface_and_base(token: &str) -> Vec<String> {
    let base = base_form(token);
    if base == token {
        vec![token.to_string()]
    } else {
        vec![token.to_string(), base.to_string()]
    }
}

/// Why the item matched, independent of the tier / 匹配来源
pub fn match_source(query: &QueryContext, item: &ContentItem) -> MatchSource {
    let q = query.text.as_str();
    let own_lang = query.lang;
    let other_lang = own_lang.opposite();
    let own = item.text(own_lang).to_lowercase();
    let other = item.text(other_lang).to_lowercase();

    if own_lang == Lang::Zh && q.chars().count() == 1 && own.contains(q) {
        return MatchSource::SingleCharacter;
    }
    if own.contains(q) {
        return MatchSource::QueryLanguage { lang: own_lang };
    }
    if other.contains(q) {
        return MatchSource::OtherLanguage { lang: other_lang };
    }

    let base = base_form(q);
    if base != q {
        for (lang, text) in [(own_lang, &own), (other_lang, &other)] {
            if text.contains(base) {
                return MatchSource::WordForm {
                    lang,
                    from: q.to_string(),
                    base: base.to_string(),
                };
            }
        }
    }

    MatchSource::Fuzzy
}

/// Score one item / 对单条内容评分
pub fn score(query: &QueryContext, item: &ContentItem) -> Result<Scored, SearchError> {
    let cosine = cosine(&item.vector, &query.vector)? as f64;
    let tier = TIER_CHAIN
        .iter()
        .find_map(|check| check(query, item))
        .unwrap_or(MatchTier::None);

    Ok(Scored {
        id: item.id,
        cosine,
        score: cosine + tier.boost(),
        tier,
        source: match_source(query, item),
    })
}

/// Final ordering: tier desc, score desc, id asc / 排序
pub fn compare(a: &Scored, b: &Scored) -> Ordering {
    b.tier
        .cmp(&a.tier)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort and keep the first `top_n` / 排序并截断
pub fn rank(mut scored: Vec<Scored>, top_n: usize) -> Vec<Scored> {
    scored.sort_by(compare);
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tokenizer::JiebaTokenizer;
    use crate::search::vector::{VectorMode, VectorSpace};
    use std::sync::Arc;

    struct Fixture {
        normalizer: LexicalNormalizer,
        vectors: VectorSpace,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                normalizer: LexicalNormalizer::new(Arc::new(JiebaTokenizer)),
                vectors: VectorSpace::new(),
            }
        }

        fn item(&self, id: u64, source: &str, translated: &str) -> ContentItem {
            ContentItem::new(id, source, translated, &self.normalizer, &self.vectors)
        }

        fn query(&self, text: &str, lang: Lang) -> QueryContext {
            let vector = self.vectors.vectorize(&self.normalizer.normalize(text), VectorMode::Query);
            QueryContext::new(text, lang, vector, &self.normalizer)
        }

        fn query_with_vector(&self, text: &str, lang: Lang, vector: Vector) -> QueryContext {
            QueryContext::new(text, lang, vector, &self.normalizer)
        }
    }

    fn scored(id: u64, tier: MatchTier, cosine: f64) -> Scored {
        Scored {
            id,
            cosine,
            score: cosine + tier.boost(),
            tier,
            source: MatchSource::Fuzzy,
        }
    }

    #[test]
    fn test_single_letter_tiers() {
        let fx = Fixture::new();
        let q = fx.query("P", Lang::En);

        let leading = fx.item(1, "Python编程入门教程", "Python Programming Tutorial");
        let later = fx.item(2, "如何制作美味的红烧肉", "How to make delicious braised pork");
        let inside = fx.item(3, "瑜伽入门指南", "Yoga guide for beginners help");
        let none = fx.item(4, "世界历史大事件", "Major events in world history");

        assert_eq!(single_letter_tier(&q, &leading), Some(MatchTier::LeadingLetter));
        assert_eq!(single_letter_tier(&q, &later), Some(MatchTier::WordInitial));
        assert_eq!(single_letter_tier(&q, &inside), Some(MatchTier::LetterContained));
        assert_eq!(single_letter_tier(&q, &none), None);
    }

    #[test]
    fn test_single_letter_only_for_ascii_letters() {
        let fx = Fixture::new();
        let item = fx.item(1, "Python编程入门教程", "Python Programming Tutorial");
        assert_eq!(single_letter_tier(&fx.query("py", Lang::En), &item), None);
        assert_eq!(single_letter_tier(&fx.query("家", Lang::Zh), &item), None);
        assert_eq!(single_letter_tier(&fx.query("1", Lang::Zh), &item), None);
    }

    #[test]
    fn test_substring_tier_ordered() {
        let fx = Fixture::new();
        let item = fx.item(1, "如何制作美味的红烧肉", "How to make delicious braised pork");
        let q = fx.query("红烧肉", Lang::Zh);
        assert!(substring_points(&q, &item) >= 2);
        assert_eq!(substring_tier(&q, &item), Some(MatchTier::OrderedSubstring));
    }

    #[test]
    fn test_substring_tier_word_form() {
        let fx = Fixture::new();
        let item = fx.item(2, "Python编程入门教程", "Python Programming Tutorial");
        // "programs" folds to "program", which the English text contains
        let q = fx.query("programs", Lang::En);
        assert_eq!(substring_tier(&q, &item), Some(MatchTier::OrderedSubstring));
    }

    #[test]
    fn test_substring_tier_unordered() {
        let fx = Fixture::new();
        let item = fx.item(1, "世界历史大事件", "Major events in world history");
        // letters of "dowrl" fit inside "world" but the word never appears in order
        let q = fx.query("dowrl", Lang::En);
        assert_eq!(substring_points(&q, &item), 1);
        assert_eq!(substring_tier(&q, &item), Some(MatchTier::UnorderedSubset));
    }

    #[test]
    fn test_function_words_do_not_fire_substring_tier() {
        let fx = Fixture::new();
        let item = fx.item(1, "今天的天气", "Weather today");
        // only "的" is shared, and single characters are dropped from longer queries
        let q = fx.query("红烧肉的做法", Lang::Zh);
        assert!(!q.zh_tokens.contains(&"的".to_string()));
        assert_eq!(substring_points(&q, &item), 0);
        assert_eq!(substring_tier(&q, &item), None);
    }

    #[test]
    fn test_single_character_query_keeps_its_token() {
        let fx = Fixture::new();
        let item = fx.item(1, "如何制作美味的红烧肉", "How to make delicious braised pork");
        let q = fx.query("肉", Lang::Zh);
        assert_eq!(q.zh_tokens, vec!["肉".to_string()]);
        assert_eq!(substring_tier(&q, &item), Some(MatchTier::OrderedSubstring));
    }

    #[test]
    fn test_substring_tier_none() {
        let fx = Fixture::new();
        let item = fx.item(1, "世界历史大事件", "Major events in world history");
        let q = fx.query("面试", Lang::Zh);
        assert_eq!(substring_tier(&q, &item), None);
    }

    #[test]
    fn test_match_source_labels() {
        let fx = Fixture::new();
        let item = fx.item(1, "如何制作美味的红烧肉", "How to make delicious braised pork");

        assert_eq!(
            match_source(&fx.query("红烧肉", Lang::Zh), &item),
            MatchSource::QueryLanguage { lang: Lang::Zh }
        );
        assert_eq!(
            match_source(&fx.query("pork", Lang::En), &item),
            MatchSource::QueryLanguage { lang: Lang::En }
        );
        assert_eq!(
            match_source(&fx.query("making", Lang::En), &item),
            MatchSource::WordForm {
                lang: Lang::En,
                from: "making".to_string(),
                base: "make".to_string()
            }
        );
        assert_eq!(match_source(&fx.query("肉", Lang::Zh), &item), MatchSource::SingleCharacter);
        assert_eq!(match_source(&fx.query("面试", Lang::Zh), &item), MatchSource::Fuzzy);
    }

    #[test]
    fn test_match_source_other_language() {
        let fx = Fixture::new();
        let item = fx.item(2, "Python编程入门教程", "Python Programming Tutorial");
        assert_eq!(
            match_source(&fx.query("编程", Lang::En), &item),
            MatchSource::OtherLanguage { lang: Lang::Zh }
        );
    }

    #[test]
    fn test_higher_tier_beats_higher_cosine() {
        let fx = Fixture::new();
        let pork = fx.item(1, "如何制作美味的红烧肉", "How to make delicious braised pork");
        let python = fx.item(2, "Python编程入门教程", "Python Programming Tutorial");

        // Query vector identical to the pork item, but "p" leads the python item
        let q = fx.query_with_vector("p", Lang::En, pork.vector.clone());
        let a = score(&q, &pork).unwrap();
        let b = score(&q, &python).unwrap();
        assert!(a.cosine > b.cosine);

        let ranked = rank(vec![a, b], 10);
        assert_eq!(ranked[0].id, 2);
        assert_eq!(ranked[0].tier, MatchTier::LeadingLetter);
        assert_eq!(ranked[1].tier, MatchTier::WordInitial);
    }

    #[test]
    fn test_score_dimension_mismatch() {
        let fx = Fixture::new();
        let item = fx.item(1, "如何制作美味的红烧肉", "How to make delicious braised pork");
        let q = fx.query_with_vector("红烧肉", Lang::Zh, vec![1.0; 3]);
        assert!(matches!(score(&q, &item), Err(SearchError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_rank_orders_by_tier_then_score_then_id() {
        let ranked = rank(
            vec![
                scored(1, MatchTier::None, 0.99),
                scored(2, MatchTier::UnorderedSubset, 0.10),
                scored(3, MatchTier::OrderedSubstring, 0.20),
                scored(4, MatchTier::OrderedSubstring, 0.90),
                scored(5, MatchTier::LeadingLetter, 0.0),
                scored(6, MatchTier::OrderedSubstring, 0.90),
            ],
            5,
        );
        let ids: Vec<u64> = ranked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5, 4, 6, 3, 2]);
    }

    #[test]
    fn test_boosts_never_invert_tiers() {
        let tiers = [
            MatchTier::None,
            MatchTier::UnorderedSubset,
            MatchTier::OrderedSubstring,
            MatchTier::LetterContained,
            MatchTier::WordInitial,
            MatchTier::LeadingLetter,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[1].boost() > pair[0].boost());
            assert!(pair[1] > pair[0]);
        }
    }
}
