use std::sync::Arc;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tera::Tera;
use log::{info, warn, error};

use crate::api::pages;
use crate::data::{normalize, TickerRegistry};
use crate::error::PriceError;
use crate::market::{PriceQuote, PriceResolver};

#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<TickerRegistry>,
    pub resolver: PriceResolver,
    pub templates: Arc<Tera>,
}

/// First `ticker` value in the query string; later repeats are ignored.
fn first_ticker(params: &[(String, String)]) -> Option<&str> {
    params.iter()
        .find(|(key, _)| key == "ticker")
        .map(|(_, value)| value.as_str())
}

#[derive(Debug)]
pub enum ApiError {
    InvalidTicker,
    PriceNotFound(String),
    FetchFailed(String),
    Render,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTicker => StatusCode::BAD_REQUEST,
            ApiError::PriceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::FetchFailed(_) | ApiError::Render => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidTicker => "Invalid or missing ticker in data file".to_string(),
            ApiError::PriceNotFound(ticker) => format!("Could not retrieve market price for {}", ticker),
            ApiError::FetchFailed(ticker) => format!("Failed to fetch data from Yahoo Finance for {}", ticker),
            ApiError::Render => "Failed to render page".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "error": self.message() }))).into_response()
    }
}

// GET /get_market_price?ticker=X - Price, quantity and 50 DMA for a held ticker
pub async fn get_market_price(
    State(state): State<ApiState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PriceQuote>, ApiError> {
    let Query(params) = query.map_err(|e| {
        warn!("Rejected price request with unreadable query: {}", e);
        ApiError::InvalidTicker
    })?;
    let ticker = first_ticker(&params).unwrap_or_default().trim().to_uppercase();

    let entry = match state.registry.lookup(&ticker) {
        Some(entry) if !ticker.is_empty() => entry,
        _ => {
            warn!("Rejected price request for unknown ticker '{}'", ticker);
            return Err(ApiError::InvalidTicker);
        }
    };

    let symbol = normalize(&ticker);

    match state.resolver.resolve(&symbol).await {
        Ok(price) => {
            info!("Price served for {} ({})", ticker, symbol);
            Ok(Json(price.with_quantity(entry.quantity)))
        }
        Err(PriceError::NotFound(_)) => {
            warn!("No market price available for {} ({})", ticker, symbol);
            Err(ApiError::PriceNotFound(ticker))
        }
        Err(e) => {
            error!("Error fetching data for {} ({}): {:?}", ticker, symbol, e);
            Err(ApiError::FetchFailed(ticker))
        }
    }
}

// GET /health - Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "nse_dashboard",
        "timestamp": chrono::Utc::now()
    }))
}

// Create the API router
pub fn create_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/option-calculator", get(pages::option_calculator))
        .route("/get_market_price", get(get_market_price))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::market::provider::InstrumentInfo;
    use crate::market::resolver::tests::FakeProvider;

    fn test_router(provider: FakeProvider) -> Router {
        let registry = TickerRegistry::from_reader(Cursor::new("INFY,10\nNIFTY,50\nGONE,1\nFLAKY,2")).unwrap();
        create_api_router(ApiState {
            registry: Arc::new(registry),
            resolver: PriceResolver::new(Arc::new(provider)),
            templates: Arc::new(pages::load_templates().unwrap()),
        })
    }

    fn default_provider() -> FakeProvider {
        FakeProvider::default()
            .with_info("INFY.NS", InstrumentInfo {
                current_price: Some(1500.0),
                regular_market_price: None,
                fifty_day_average: Some(1450.0),
            })
            .with_info("^NSEI", InstrumentInfo::default())
            .with_bars("^NSEI", &[Some(22000.456)])
            .with_info("GONE.NS", InstrumentInfo::default())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_market_price_success() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=infy").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["market_price"], 1500.0);
        assert_eq!(body["quantity"], 10);
        assert_eq!(body["dma_50_price"], 1450.0);
        assert_eq!(body["dma_50_percent"], 96.67);
    }

    #[tokio::test]
    async fn test_get_market_price_index_uses_history() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=NIFTY").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["market_price"], 22000.46);
        assert_eq!(body["quantity"], 50);
        assert_eq!(body["dma_50_percent"], 0.0);
    }

    #[tokio::test]
    async fn test_get_market_price_unknown_ticker() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=UNKNOWN").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid or missing ticker in data file");
    }

    #[tokio::test]
    async fn test_get_market_price_missing_ticker() {
        let (status, _) = get_json(test_router(default_provider()), "/get_market_price").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(test_router(default_provider()), "/get_market_price?ticker=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_market_price_repeated_ticker_uses_first() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=INFY&ticker=TCS").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 10);
        assert_eq!(body["market_price"], 1500.0);
    }

    #[tokio::test]
    async fn test_get_market_price_undecodable_ticker_is_json_400() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid or missing ticker in data file");
    }

    #[test]
    fn test_first_ticker() {
        let params = vec![
            ("other".to_string(), "x".to_string()),
            ("ticker".to_string(), "infy".to_string()),
            ("ticker".to_string(), "tcs".to_string()),
        ];
        assert_eq!(first_ticker(&params), Some("infy"));
        assert_eq!(first_ticker(&[]), None);
    }

    #[tokio::test]
    async fn test_get_market_price_not_found() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=GONE").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Could not retrieve market price for GONE");
    }

    #[tokio::test]
    async fn test_get_market_price_upstream_failure() {
        let (status, body) = get_json(test_router(default_provider()), "/get_market_price?ticker=FLAKY").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data from Yahoo Finance for FLAKY");
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get_json(test_router(default_provider()), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_option_calculator_page_lists_tickers() {
        let response = test_router(default_provider())
            .oneshot(Request::builder().uri("/option-calculator").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        let flaky = html.find(r#"value="FLAKY""#).unwrap();
        let infy = html.find(r#"value="INFY""#).unwrap();
        assert!(flaky < infy);
    }

    #[tokio::test]
    async fn test_home_page() {
        let response = test_router(default_provider())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
