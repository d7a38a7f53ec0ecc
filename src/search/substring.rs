//! Substring index - partial match artifacts computed at index time / 子串索引
//!
//! - Chinese tokens: every contiguous substring / 中文：所有连续子串
//! - English tokens: every order-independent letter sub-multiset, stored as
//!   its sorted-letter key / 英文：所有乱序字母子集（按字母排序存储）

use std::collections::{BTreeMap, HashSet};

/// Longest token expanded into letter subsets; longer ones are checked by
/// letter counts instead / 超过该长度的词不展开子集
pub const MAX_SUBSET_LETTERS: usize = 10;

/// All contiguous substrings of length >= 1 / 所有连续子串
pub fn all_substrings(token: &str) -> HashSet<String> {
    let chars: Vec<char> = token.chars().collect();
    let mut subs = HashSet::new();
    for start in 0..chars.len() {
        for end in start + 1..=chars.len() {
            subs.insert(chars[start..end].iter().collect());
        }
    }
    subs
}

/// Sorted lower-cased letters, the canonical key of a letter multiset / 字母多重集键
pub fn letter_key(token: &str) -> String {
    let mut chars: Vec<char> = token.to_lowercase().chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

fn letter_counts(token: &str) -> BTreeMap<char, usize> {
    let mut counts = BTreeMap::new();
    for c in token.to_lowercase().chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

/// All non-empty letter sub-multisets, case-insensitive / 所有乱序字母子集
pub fn all_letter_subsets(token: &str) -> HashSet<String> {
    let counts: Vec<(char, usize)> = letter_counts(token).into_iter().collect();
    let mut subsets: Vec<String> = vec![String::new()];

    // Choose 0..=n copies of each distinct letter in sorted order, so every
    // generated string is already its own canonical key
    for (letter, n) in counts {
        let mut next = Vec::with_capacity(subsets.len() * (n + 1));
        for prefix in &subsets {
            for copies in 0..=n {
                let mut s = prefix.clone();
                s.extend(std::iter::repeat(letter).take(copies));
                next.push(s);
            }
        }
        subsets = next;
    }

    subsets.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Whether `needle`'s letters are a sub-multiset of `hay`'s / 字母多重集包含
pub fn letters_contained(needle: &str, hay: &str) -> bool {
    let hay = letter_counts(hay);
    letter_counts(needle)
        .into_iter()
        .all(|(c, n)| hay.get(&c).copied().unwrap_or(0) >= n)
}

/// Per-item partial match sets / 单条内容的部分匹配集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringIndex {
    /// Substrings of the Chinese tokens / 中文子串集合
    pub source_substrings: HashSet<String>,
    /// Letter subsets of the English tokens / 英文字母子集集合
    pub translated_subsets: HashSet<String>,
    /// English tokens too long to expand / 过长未展开的英文词
    long_tokens: Vec<String>,
}

impl SubstringIndex {
    pub fn build(source_tokens: &[String], translated_tokens: &[String]) -> Self {
        let mut index = Self::default();
        for token in source_tokens {
            index.source_substrings.extend(all_substrings(token));
        }
        for token in translated_tokens {
            if token.chars().count() > MAX_SUBSET_LETTERS {
                index.long_tokens.push(token.to_lowercase());
            } else {
                index.translated_subsets.extend(all_letter_subsets(token));
            }
        }
        index
    }

    /// Some substring of `token` occurs among the Chinese substrings / 存在共同子串
    pub fn shares_substring(&self, token: &str) -> bool {
        if self.source_substrings.is_empty() {
            return false;
        }
        all_substrings(token)
            .iter()
            .any(|sub| self.source_substrings.contains(sub))
    }

    /// `token`'s letters, in any order, fit inside one English token / 乱序字母包含
    pub fn contains_letters(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.translated_subsets.contains(&letter_key(token))
            || self.long_tokens.iter().any(|long| letters_contained(token, long))
    }
}
