//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use crate::models::Network;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Quote endpoint returning `{id: {usd, usd_24h_change}}`.
    pub price_api_url: String,
    /// Interval between price refreshes.
    pub refresh_interval: Duration,
    /// Decimal precision requested from the quote API.
    pub price_precision: u8,
    /// Per-request timeout on the HTTP client.
    pub request_timeout: Duration,
    /// Exclusive sanity bounds for every fetched USD price.
    pub price_bounds: PriceBounds,
    /// File backing the key-value store.
    pub storage_path: PathBuf,
    pub from_symbol: String,
    pub to_symbol: String,
    /// Amount typed into the from-side by the demo loop
    pub demo_amount: String,
    /// Wallet to connect at startup, if any.
    pub wallet_id: Option<String>,
    pub network: Network,
}

/// Open interval `(min, max)` a fetched price must fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 10.0,
        }
    }
}

impl PriceBounds {
    pub fn contains(&self, price: f64) -> bool {
        price.is_finite() && price > self.min && price < self.max
    }
}

impl AppConfig {
    /// Load configuration from environment variables (after `.env`).
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let price_api_url =
            lookup("PRICE_API_URL").unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string());
        url::Url::parse(&price_api_url)?;

        let refresh_secs: u64 = parse_or(&lookup, "PRICE_REFRESH_SECS", 30)?;
        if refresh_secs == 0 {
            return Err(AppError::Config(
                "PRICE_REFRESH_SECS must be greater than zero".into(),
            ));
        }
        let price_precision: u8 = parse_or(&lookup, "PRICE_PRECISION", 6)?;
        let timeout_secs: u64 = parse_or(&lookup, "PRICE_TIMEOUT_SECS", 10)?;

        let price_bounds = PriceBounds {
            min: parse_or(&lookup, "PRICE_MIN_USD", PriceBounds::default().min)?,
            max: parse_or(&lookup, "PRICE_MAX_USD", PriceBounds::default().max)?,
        };
        if !(price_bounds.min >= 0.0 && price_bounds.min < price_bounds.max) {
            return Err(AppError::Config(format!(
                "invalid price bounds ({}, {})",
                price_bounds.min, price_bounds.max
            )));
        }

        let storage_path = lookup("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".swap-card/storage.json"));

        let from_symbol = lookup("FROM_SYMBOL")
            .unwrap_or_else(|| "XLM".into())
            .to_ascii_uppercase();
        let to_symbol = lookup("TO_SYMBOL")
            .unwrap_or_else(|| "USDC".into())
            .to_ascii_uppercase();
        if from_symbol == to_symbol {
            return Err(AppError::Config(format!(
                "FROM_SYMBOL and TO_SYMBOL must differ (both {from_symbol})"
            )));
        }

        let demo_amount = lookup("DEMO_AMOUNT").unwrap_or_else(|| "100".into());
        let wallet_id = lookup("WALLET_ID").filter(|id| !id.trim().is_empty());
        let network = match lookup("WALLET_NETWORK") {
            Some(raw) => raw.parse()?,
            None => Network::default(),
        };

        Ok(Self {
            price_api_url,
            refresh_interval: Duration::from_secs(refresh_secs),
            price_precision,
            request_timeout: Duration::from_secs(timeout_secs),
            price_bounds,
            storage_path,
            from_symbol,
            to_symbol,
            demo_amount,
            wallet_id,
            network,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
