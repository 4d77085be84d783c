mod api;
mod config;
mod data;
mod error;
mod market;

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use log::{info, warn, error};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::{ApiState, create_api_router, load_templates};
use crate::config::Config;
use crate::data::TickerRegistry;
use crate::market::{MarketDataProvider, PriceResolver, YahooClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    config.log_config();

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    // Ticker table is built once and shared read-only
    let registry = TickerRegistry::load(&config.ticker_file);
    if registry.is_empty() {
        warn!("No tickers loaded; every price request will be rejected");
    }

    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooClient::new(
        &config.provider_base_url,
        Duration::from_secs(config.provider_timeout_secs),
    )?);

    let api_state = ApiState {
        registry: Arc::new(registry),
        resolver: PriceResolver::new(provider),
        templates: Arc::new(load_templates()?),
    };

    let router = create_api_router(api_state)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("🌐 Dashboard running at http://{}", config.bind_address);

    axum::serve(listener, router).await?;

    Ok(())
}
