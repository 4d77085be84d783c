use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use log::{debug, warn};

use crate::error::ProviderError;
use crate::market::provider::{DailyBar, InstrumentInfo, MarketDataProvider};

// Yahoo rejects requests without a browser-looking agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

// Three months of daily bars covers the 50-session window
const INFO_RANGE: &str = "3mo";
const HISTORY_RANGE: &str = "1d";
const FIFTY_DAY_WINDOW: usize = 50;

/// Market-data provider backed by the public Yahoo Finance HTTP API.
pub struct YahooClient {
    client: Client,
    base_url: String,
}

// `v8/finance/chart` schema
#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Deserialize, Debug)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_chart(&self, symbol: &str, range: &str) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, urlencoding::encode(symbol));
        debug!("GET {} range={}", url, range);

        Ok(self.client.get(&url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?)
    }

    fn check_status(status: StatusCode, symbol: &str) -> Result<(), ProviderError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(ProviderError::Status {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            })
        }
    }
}

fn decode_chart(body: &str, symbol: &str) -> Result<Option<ChartResult>, ProviderError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("chart response: {}", e)))?;

    if let Some(err) = &envelope.chart.error {
        warn!(
            "[{}] chart error {}: {}",
            symbol,
            err.code.as_deref().unwrap_or("unknown"),
            err.description.as_deref().unwrap_or("")
        );
    }

    Ok(envelope.chart.result.and_then(|results| results.into_iter().next()))
}

fn bars_of(result: ChartResult) -> Vec<DailyBar> {
    let closes = result.indicators.quote.into_iter()
        .next()
        .map(|series| series.close)
        .unwrap_or_default();

    result.timestamp.into_iter()
        .zip(closes.into_iter().chain(std::iter::repeat(None)))
        .map(|(timestamp, close)| DailyBar { timestamp, close })
        .collect()
}

/// Mean of the trailing `FIFTY_DAY_WINDOW` non-null closes; `None` without any.
fn fifty_day_average(bars: &[DailyBar]) -> Option<f64> {
    let closes: Vec<f64> = bars.iter()
        .rev()
        .filter_map(|bar| bar.close.filter(|c| c.is_finite()))
        .take(FIFTY_DAY_WINDOW)
        .collect();

    if closes.is_empty() {
        None
    } else {
        Some(closes.iter().sum::<f64>() / closes.len() as f64)
    }
}

fn parse_info(body: &str, symbol: &str) -> Result<InstrumentInfo, ProviderError> {
    let Some(result) = decode_chart(body, symbol)? else {
        return Ok(InstrumentInfo::default());
    };

    let regular_market_price = result.meta.regular_market_price;
    let bars = bars_of(result);

    Ok(InstrumentInfo {
        current_price: None,
        regular_market_price,
        fifty_day_average: fifty_day_average(&bars),
    })
}

fn parse_chart(body: &str, symbol: &str) -> Result<Vec<DailyBar>, ProviderError> {
    Ok(decode_chart(body, symbol)?.map(bars_of).unwrap_or_default())
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_info(&self, symbol: &str) -> Result<InstrumentInfo, ProviderError> {
        let response = self.get_chart(symbol, INFO_RANGE).await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("[{}] no chart metadata from provider", symbol);
            return Ok(InstrumentInfo::default());
        }

        Self::check_status(response.status(), symbol)?;
        parse_info(&response.text().await?, symbol)
    }

    async fn fetch_daily_bars(&self, symbol: &str) -> Result<Vec<DailyBar>, ProviderError> {
        let response = self.get_chart(symbol, HISTORY_RANGE).await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("[{}] no chart data from provider", symbol);
            return Ok(Vec::new());
        }

        Self::check_status(response.status(), symbol)?;
        parse_chart(&response.text().await?, symbol)
    }
}
