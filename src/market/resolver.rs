use std::sync::Arc;
use serde::Serialize;
use log::{debug, info};

use crate::error::PriceError;
use crate::market::provider::MarketDataProvider;

/// Price figures resolved for one provider symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketPrice {
    pub market_price: f64,
    pub dma_50_price: f64,
    pub dma_50_percent: f64,
}

/// Response body of `/get_market_price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub market_price: f64,
    pub quantity: u64,
    pub dma_50_price: f64,
    pub dma_50_percent: f64,
}

impl MarketPrice {
    pub fn with_quantity(self, quantity: u64) -> PriceQuote {
        PriceQuote {
            market_price: self.market_price,
            quantity,
            dma_50_price: self.dma_50_price,
            dma_50_percent: self.dma_50_percent,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Zero and non-finite prices count as missing
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

#[derive(Clone)]
pub struct PriceResolver {
    provider: Arc<dyn MarketDataProvider>,
}

impl PriceResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Resolves the current price and 50-day average for a provider symbol.
    ///
    /// The price comes from the instrument's current price, then its regular
    /// market price, then the latest daily close. Provider failures are not
    /// retried.
    pub async fn resolve(&self, symbol: &str) -> Result<MarketPrice, PriceError> {
        let info = self.provider.fetch_info(symbol).await?;

        let mut market_price = present(info.current_price)
            .or_else(|| present(info.regular_market_price));

        if market_price.is_none() {
            debug!("[{}] no price in metadata, falling back to daily history", symbol);
            let bars = self.provider.fetch_daily_bars(symbol).await?;
            market_price = bars.iter().rev().find_map(|bar| present(bar.close));
        }

        let market_price = market_price.ok_or_else(|| PriceError::NotFound(symbol.to_string()))?;

        let dma_50_price = info.fifty_day_average.filter(|v| v.is_finite()).unwrap_or(0.0);
        let dma_50_percent = if market_price > 0.0 {
            (dma_50_price / market_price) * 100.0
        } else {
            0.0
        };

        info!("[{}] resolved price {:.2} (50 DMA {:.2})", symbol, market_price, dma_50_price);

        Ok(MarketPrice {
            market_price: round2(market_price),
            dma_50_price: round2(dma_50_price),
            dma_50_percent: round2(dma_50_percent),
        })
    }
}
