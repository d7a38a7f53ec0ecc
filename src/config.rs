//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::search::{EngineSettings, HotTopicSettings};
use crate::translate::baidu::BAIDU_ENDPOINT;

/// Environment variables overriding the translation credentials / 翻译凭据环境变量
pub const ENV_APP_ID: &str = "BAIDU_APP_ID";
pub const ENV_SECRET_KEY: &str = "BAIDU_SECRET_KEY";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Translation backend / 翻译服务配置
    pub translation: TranslationConfig,
    /// Translation cache persistence / 翻译缓存配置
    pub cache: CacheConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
    /// Hot topic tracking / 热点话题配置
    pub hot_topics: HotTopicConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Translation configuration / 翻译配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Baidu app id, empty disables online translation / 百度翻译 APP ID
    pub app_id: String,
    /// Baidu secret key / 百度翻译密钥
    pub secret_key: String,
    pub endpoint: String,
    /// Per-call timeout in seconds / 单次翻译超时（秒）
    pub timeout_secs: u64,
}

/// Cache configuration / 缓存配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Data directory path / 数据目录路径
    pub data_dir: String,
    /// Cache file name (relative to data_dir) / 缓存文件名
    pub file: String,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results returned when a request gives no top_n / 默认返回条数
    pub default_top_n: usize,
    /// Index the built-in sample corpus at startup / 启动时载入示例内容
    pub seed_samples: bool,
}

/// Hot topic configuration / 热点话题配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotTopicConfig {
    pub threshold: u32,
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8190,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            secret_key: String::new(),
            endpoint: BAIDU_ENDPOINT.to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            file: "translation_cache.json".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_n: 5,
            seed_samples: true,
        }
    }
}

impl Default for HotTopicConfig {
    fn default() -> Self {
        let defaults = HotTopicSettings::default();
        Self {
            threshold: defaults.threshold,
            ttl_secs: defaults.ttl.as_secs(),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
        }
    }
}

impl TranslationConfig {
    /// Both credentials present / 凭据是否完整
    pub fn has_credentials(&self) -> bool {
        !self.app_id.is_empty() && !self.secret_key.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Get the full data directory path / 获取完整的数据目录路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.cache.data_dir)
    }

    /// Get the translation cache file path / 获取翻译缓存文件路径
    pub fn get_cache_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.cache.file)
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn hot_topic_settings(&self) -> HotTopicSettings {
        HotTopicSettings {
            threshold: self.hot_topics.threshold.max(1),
            ttl: Duration::from_secs(self.hot_topics.ttl_secs),
            sweep_interval: Duration::from_secs(self.hot_topics.sweep_interval_secs.max(1)),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            default_top_n: self.search.default_top_n,
            hot_topics: self.hot_topic_settings(),
        }
    }

    /// Apply credential overrides from the environment / 从环境变量覆盖凭据
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(app_id) = lookup(ENV_APP_ID).filter(|v| !v.is_empty()) {
            self.translation.app_id = app_id;
        }
        if let Some(secret) = lookup(ENV_SECRET_KEY).filter(|v| !v.is_empty()) {
            self.translation.secret_key = secret;
        }
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
///
/// Environment credentials are applied after loading and never written back.
pub fn load_config() -> Result<AppConfig, String> {
    let mut config = load_config_from(&get_config_path())?;
    config.apply_env_overrides();
    Ok(config)
}

/// Load (or create) the configuration at an explicit path / 从指定路径加载配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = load_config_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        // the written file loads back unchanged
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"port": 9000}, "hot_topics": {"threshold": 3}}"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.hot_topics.threshold, 3);
        assert_eq!(config.hot_topics.ttl_secs, 300);
        assert_eq!(config.translation.timeout_secs, 5);
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.server.port = 9100;
        config.search.seed_samples = false;
        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn test_derived_settings() {
        let config = AppConfig::default();
        assert_eq!(config.get_bind_address(), "0.0.0.0:8190");
        assert_eq!(config.get_cache_path(), PathBuf::from("data").join("translation_cache.json"));

        let settings = config.engine_settings();
        assert_eq!(settings.default_top_n, 5);
        assert_eq!(settings.hot_topics, HotTopicSettings::default());
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config = AppConfig::default();
        assert!(!config.translation.has_credentials());

        config.apply_overrides(|key| match key {
            ENV_APP_ID => Some("app".to_string()),
            ENV_SECRET_KEY => Some("secret".to_string()),
            _ => None,
        });
        assert!(config.translation.has_credentials());
        assert_eq!(config.translation.app_id, "app");

        // empty values leave the file values alone
        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.translation.secret_key, "secret");
    }
}
