//! Error types for price lookups.
//!
//! `ProviderError` covers everything that can go wrong while talking to the
//! market-data provider. `PriceError` is what the resolver hands back to
//! request handlers: either the provider had no price at all, or the call
//! itself failed.
use thiserror::Error;

/// Failure while calling the external market-data provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Provider returned status {status} for {symbol}")]
    Status { status: u16, symbol: String },

    /// Response arrived but did not have the expected shape.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Outcome of a failed price resolution.
#[derive(Error, Debug)]
pub enum PriceError {
    /// Neither metadata nor daily history carried a usable price.
    #[error("No price data available for {0}")]
    NotFound(String),

    #[error("Failed to fetch price data: {0}")]
    Upstream(#[from] ProviderError),
}
