use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use bilingual_search::config;
use bilingual_search::samples;
use bilingual_search::search::{JiebaTokenizer, SearchEngine};
use bilingual_search::translate::{BaiduTranslator, IdentityTranslator, TranslationCache, Translator};
use state::AppState;

/// Pause between sample translations when calling the online API / 示例翻译间隔
const SAMPLE_PACE: Duration = Duration::from_millis(100);

/// Pick the translation backend from the configuration / 选择翻译后端
fn build_translator(app_config: &config::AppConfig) -> anyhow::Result<Arc<dyn Translator>> {
    let translation = &app_config.translation;
    if !translation.has_credentials() {
        tracing::warn!(
            "No translation credentials (set {} / {}), queries will not be translated",
            config::ENV_APP_ID,
            config::ENV_SECRET_KEY
        );
        return Ok(Arc::new(IdentityTranslator));
    }

    let translator = BaiduTranslator::new(
        translation.app_id.clone(),
        translation.secret_key.clone(),
        translation.endpoint.clone(),
        translation.timeout(),
    )?;
    tracing::info!("Using Baidu translation at {}", translation.endpoint);
    Ok(Arc::new(translator))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bilingual_search=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("bilingual-search {} (built {})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIME"));

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Create data directory if not exists / 创建数据目录
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let translator = build_translator(&app_config)?;
    let online = app_config.translation.has_credentials();

    let cache = Arc::new(TranslationCache::new(
        translator,
        Some(app_config.get_cache_path()),
        app_config.translation.timeout(),
    ));
    let restored = cache.load();
    tracing::info!("Translation cache restored: {} entries", restored);

    let engine = Arc::new(SearchEngine::new(
        app_config.engine_settings(),
        cache,
        Arc::new(JiebaTokenizer),
    ));

    if app_config.search.seed_samples {
        let pace = if online { SAMPLE_PACE } else { Duration::ZERO };
        samples::index_samples(&engine, pace).await;
    }

    let app = api::router(Arc::new(AppState::new(engine.clone())));

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    Ok(())
}
