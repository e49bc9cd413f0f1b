//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::market::QuoteMode;
use crate::quoting::QuotePolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Venue API ===
    /// Base URL of the venue REST API.
    #[serde(default = "default_api_base")]
    pub kalshi_api_base: String,

    /// Optional API key sent as a bearer token.
    #[serde(default)]
    pub kalshi_api_key: Option<String>,

    // === Quoting Policy ===
    /// Markets to quote, e.g. "INXD-26AUG:yes,INXD-27AUG:both".
    /// A bare ticker defaults to mode "both".
    #[serde(default)]
    pub quote_tickers: Option<String>,

    /// Only quote when the best bid is strictly below this price (cents).
    #[serde(default = "default_max_bid_price")]
    pub max_bid_price: u32,

    /// Only quote when the quantity resting at the best bid strictly
    /// exceeds this many contracts.
    #[serde(default = "default_min_depth_at_best")]
    pub min_depth_at_best: u32,

    /// Stop quoting a leg once exposure on it exceeds this many contracts.
    #[serde(default = "default_position_limit")]
    pub position_limit: i64,

    /// Contracts per resting quote.
    #[serde(default = "default_quote_size")]
    pub quote_size: u32,

    /// How long a key stays pending after a placement attempt, giving the
    /// resting-order list time to reflect the new order.
    #[serde(default = "default_pending_grace_ms")]
    pub pending_grace_ms: u64,

    /// Interval between decision ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    // === Operation Modes ===
    /// Simulation mode (evaluate and log, but place no real orders).
    #[serde(default = "default_true")]
    pub dry_run: bool,

    // === HTTP Client ===
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Connection pool size per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Server Configuration ===
    /// HTTP server port for health/metrics endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_api_base() -> String {
    "https://api.elections.kalshi.com/trade-api/v2".to_string()
}

fn default_max_bid_price() -> u32 {
    90
}

fn default_min_depth_at_best() -> u32 {
    69
}

fn default_position_limit() -> i64 {
    50
}

fn default_quote_size() -> u32 {
    10
}

fn default_pending_grace_ms() -> u64 {
    2_000
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_true() -> bool {
    true
}

fn default_http_timeout_ms() -> u64 {
    2_000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.kalshi_api_base.is_empty() {
            return Err("KALSHI_API_BASE is required".to_string());
        }

        if !(2..=99).contains(&self.max_bid_price) {
            return Err("MAX_BID_PRICE must be within 2..=99".to_string());
        }

        if self.quote_size == 0 {
            return Err("QUOTE_SIZE must be positive".to_string());
        }

        if self.position_limit < 0 {
            return Err("POSITION_LIMIT must be non-negative".to_string());
        }

        if self.tick_interval_ms < 100 {
            return Err("TICK_INTERVAL_MS must be at least 100".to_string());
        }

        self.quote_modes().map(|_| ())
    }

    /// Build the engine policy from the configured thresholds.
    pub fn policy(&self) -> QuotePolicy {
        QuotePolicy {
            max_bid_price: self.max_bid_price,
            min_depth_at_best: self.min_depth_at_best,
            position_limit: self.position_limit,
            quote_size: self.quote_size,
            pending_grace: Duration::from_millis(self.pending_grace_ms),
        }
    }

    /// Parse the `QUOTE_TICKERS` list into (ticker, mode) pairs.
    pub fn quote_modes(&self) -> Result<Vec<(String, QuoteMode)>, String> {
        let Some(list) = self.quote_tickers.as_deref() else {
            return Ok(Vec::new());
        };

        let mut modes = Vec::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (ticker, mode) = match entry.split_once(':') {
                Some((ticker, mode)) => {
                    let mode = mode
                        .parse::<QuoteMode>()
                        .map_err(|_| format!("invalid quote mode in QUOTE_TICKERS: {entry}"))?;
                    (ticker, mode)
                }
                None => (entry, QuoteMode::Both),
            };
            if ticker.is_empty() {
                return Err(format!("empty ticker in QUOTE_TICKERS: {entry}"));
            }
            modes.push((ticker.to_string(), mode));
        }
        Ok(modes)
    }

    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            kalshi_api_base: default_api_base(),
            kalshi_api_key: None,
            quote_tickers: None,
            max_bid_price: default_max_bid_price(),
            min_depth_at_best: default_min_depth_at_best(),
            position_limit: default_position_limit(),
            quote_size: default_quote_size(),
            pending_grace_ms: default_pending_grace_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            dry_run: true,
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_max_bid_price(), 90);
        assert_eq!(default_min_depth_at_best(), 69);
        assert_eq!(default_position_limit(), 50);
        assert_eq!(default_quote_size(), 10);
        assert!(default_true());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_thresholds() {
        let mut config = test_config();
        config.max_bid_price = 1;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.quote_size = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.tick_interval_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn quote_modes_parse_mixed_entries() {
        let mut config = test_config();
        config.quote_tickers = Some("INXD-26AUG:yes, SPX-500:both ,FED-CUT".to_string());

        let modes = config.quote_modes().unwrap();
        assert_eq!(
            modes,
            vec![
                ("INXD-26AUG".to_string(), QuoteMode::Yes),
                ("SPX-500".to_string(), QuoteMode::Both),
                ("FED-CUT".to_string(), QuoteMode::Both),
            ]
        );
    }

    #[test]
    fn quote_modes_reject_unknown_mode() {
        let mut config = test_config();
        config.quote_tickers = Some("INXD-26AUG:sideways".to_string());
        assert!(config.quote_modes().is_err());
    }
}
