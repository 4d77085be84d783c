use async_trait::async_trait;

use crate::error::ProviderError;

/// Instrument metadata as reported by the provider. Every field is optional
/// because the provider omits whatever it does not have for a symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentInfo {
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub fifty_day_average: Option<f64>,
}

/// One daily trading bar; `close` is missing for bars the provider left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub timestamp: i64,
    pub close: Option<f64>,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_info(&self, symbol: &str) -> Result<InstrumentInfo, ProviderError>;

    /// Bars for the most recent trading day, oldest first. Unknown symbols
    /// yield an empty list rather than an error.
    async fn fetch_daily_bars(&self, symbol: &str) -> Result<Vec<DailyBar>, ProviderError>;
}
