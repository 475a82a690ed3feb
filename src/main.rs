use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use stocksentiment::app;
use stocksentiment::config::AppConfig;
use stocksentiment::external::news_provider::NewsProvider;
use stocksentiment::external::newsapi::NewsApiProvider;
use stocksentiment::external::yahoo::YahooProvider;
use stocksentiment::logging::{init_logging, LoggingConfig};
use stocksentiment::services::news_service::NewsFetcher;
use stocksentiment::services::pipeline_service::HistoricPipeline;
use stocksentiment::services::price_service::PriceFetcher;
use stocksentiment::services::sentiment_service::SentimentScorer;
use stocksentiment::services::vader::VaderAnalyzer;
use stocksentiment::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env()?;

    let prices = YahooProvider::new(&config.yahoo_base_url, config.http_timeout)
        .context("failed to build Yahoo Finance client")?;

    let news: Option<Arc<dyn NewsProvider>> = match config.news_api_key.clone() {
        Some(key) => {
            let provider: Arc<dyn NewsProvider> = Arc::new(
                NewsApiProvider::new(key, &config.news_api_base_url, config.http_timeout)
                    .context("failed to build NewsAPI client")?,
            );
            Some(provider)
        }
        None => {
            tracing::warn!("NEWS_API_KEY not set; sentiment charts will be unavailable");
            None
        }
    };

    let pipeline = HistoricPipeline::new(
        PriceFetcher::new(Arc::new(prices)),
        NewsFetcher::new(news, config.news_language.clone()),
        SentimentScorer::new(Arc::new(VaderAnalyzer::new())),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        "stocksentiment backend running at http://{}/ (HTTP timeout {:?})",
        config.bind_addr,
        config.http_timeout
    );
    axum::serve(listener, app).await?;

    Ok(())
}
