use std::env;
use std::net::SocketAddr;
use log::warn;

// Server Configuration
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_STATIC_DIR: &str = "static";

// Data Configuration
pub const DEFAULT_TICKER_FILE: &str = "tickers_data.txt";

// Provider Configuration
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

pub struct Config {
    pub bind_address: String,
    pub ticker_file: String,
    pub static_dir: String,
    pub provider_base_url: String,
    pub provider_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            ticker_file: env::var("TICKER_FILE")
                .unwrap_or_else(|_| DEFAULT_TICKER_FILE.to_string()),
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string()),
            provider_base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string()),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| match raw.parse() {
                    Ok(secs) => Some(secs),
                    Err(_) => {
                        warn!("PROVIDER_TIMEOUT_SECS={} is not a number, using default", raw);
                        None
                    }
                })
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(format!("Invalid bind address: {}", self.bind_address));
        }

        if self.provider_base_url.trim().is_empty() {
            return Err("Provider base URL cannot be empty".to_string());
        }

        if self.provider_timeout_secs == 0 {
            return Err("Provider timeout must be greater than 0 seconds".to_string());
        }

        Ok(())
    }

    pub fn log_config(&self) {
        println!("Server Configuration:");
        println!("  Bind Address: {}", self.bind_address);
        println!("  Ticker File: {}", self.ticker_file);
        println!("  Static Dir: {}", self.static_dir);
        println!("  Provider: {} (timeout {}s)", self.provider_base_url, self.provider_timeout_secs);
        println!("  Log Level: {}", self.log_level);
    }
}
