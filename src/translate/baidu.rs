//! Baidu general translation API / 百度通用翻译 API
//!
//! Request signature: md5(appid + q + salt + secret_key) / 请求签名

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use super::{Lang, TranslateError, Translator};

/// Default API endpoint / 默认接口地址
pub const BAIDU_ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

#[derive(Debug, Deserialize)]
struct TransPair {
    dst: String,
}

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    #[serde(default)]
    trans_result: Option<Vec<TransPair>>,
    #[serde(default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    error_msg: Option<String>,
}

/// Baidu translator / 百度翻译
pub struct BaiduTranslator {
    client: Client,
    endpoint: String,
    app_id: String,
    secret_key: String,
}

impl BaiduTranslator {
    pub fn new(
        app_id: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            app_id: app_id.into(),
            secret_key: secret_key.into(),
        })
    }

    /// Whether both credentials are present / 凭据是否完整
    pub fn has_credentials(&self) -> bool {
        !self.app_id.is_empty() && !self.secret_key.is_empty()
    }

    fn sign(&self, query: &str, salt: u32) -> String {
        let input = format!("{}{}{}{}", self.app_id, query, salt, self.secret_key);
        format!("{:x}", md5::compute(input.as_bytes()))
    }
}

#[async_trait]
impl Translator for BaiduTranslator {
    fn name(&self) -> &'static str {
        "baidu"
    }

    async fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError> {
        if !self.has_credentials() {
            return Err(TranslateError::MissingCredentials);
        }

        let salt: u32 = rand::thread_rng().gen_range(32768..=65536);
        let sign = self.sign(text, salt);
        let salt = salt.to_string();

        let params = [
            ("q", text),
            ("from", from.code()),
            ("to", to.code()),
            ("appid", self.app_id.as_str()),
            ("salt", salt.as_str()),
            ("sign", sign.as_str()),
        ];

        let resp: BaiduResponse = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(code) = resp.error_code {
            let code = match code {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(TranslateError::Api {
                code,
                message: resp.error_msg.unwrap_or_default(),
            });
        }

        resp.trans_result
            .and_then(|pairs| pairs.into_iter().next())
            .map(|pair| pair.dst)
            .ok_or(TranslateError::EmptyResult)
    }
}
