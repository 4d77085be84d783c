pub mod provider;
pub mod resolver;
pub mod yahoo;

pub use provider::MarketDataProvider;
pub use resolver::{PriceQuote, PriceResolver};
pub use yahoo::YahooClient;
