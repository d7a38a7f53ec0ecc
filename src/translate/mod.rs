//! Translation capability / 翻译能力
//!
//! - `Translator`: the external machine translation backend / 外部机器翻译后端
//! - `TranslationCache`: memoizes translations and persists them / 翻译缓存与持久化
//! - `BaiduTranslator`: Baidu general translation API / 百度通用翻译

pub mod baidu;
pub mod cache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use baidu::BaiduTranslator;
pub use cache::{CacheStats, TranslationCache};

/// Language of a text / 文本语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// Chinese (character based) / 中文
    Zh,
    /// English (space delimited) / 英文
    En,
}

impl Lang {
    /// API language code / 语言代码
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }

    /// Any ASCII letter makes the text English, otherwise Chinese / 包含英文字母即视为英文
    pub fn detect(text: &str) -> Lang {
        if text.chars().any(|c| c.is_ascii_alphabetic()) {
            Lang::En
        } else {
            Lang::Zh
        }
    }

    /// The other language of the pair / 对侧语言
    pub fn opposite(&self) -> Lang {
        match self {
            Lang::Zh => Lang::En,
            Lang::En => Lang::Zh,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Translation failures / 翻译错误
///
/// None of these ever reach a search caller: the cache degrades every one of
/// them to the identity translation.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation credentials are not configured")]
    MissingCredentials,

    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("translation API returned no result")]
    EmptyResult,
}

/// External translation backend / 外部翻译后端
#[async_trait]
pub trait Translator: Send + Sync {
    /// Backend name for logs / 后端名称
    fn name(&self) -> &'static str;

    async fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError>;
}

/// Backend used when no credentials are configured / 未配置凭据时使用
///
/// Always reports `MissingCredentials`, so the cache stores the original text.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    fn name(&self) -> &'static str {
        "identity"
    }

    async fn translate(&self, _text: &str, _from: Lang, _to: Lang) -> Result<String, TranslateError> {
        Err(TranslateError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(Lang::detect("红烧肉"), Lang::Zh);
        assert_eq!(Lang::detect("braised pork"), Lang::En);
        assert_eq!(Lang::detect("Python编程"), Lang::En);
        assert_eq!(Lang::detect("2023年"), Lang::Zh);
        assert_eq!(Lang::detect(""), Lang::Zh);
    }

    #[test]
    fn test_lang_codes() {
        assert_eq!(Lang::Zh.to_string(), "zh");
        assert_eq!(Lang::En.opposite(), Lang::Zh);
        assert_eq!(Lang::Zh.opposite(), Lang::En);
    }
}
