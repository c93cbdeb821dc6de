//! Shared data structures used throughout the application.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// How a token is drawn on the card. Conversion logic never looks at this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLogo {
    Emoji(String),
    /// Opaque handle resolved by the rendering layer (path, URL, sprite id).
    ImageRef(String),
}

/// A tradable token. Its USD price lives in the current [`PriceSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub symbol: String,
    pub display_name: String,
    pub logo: AssetLogo,
    /// Identifier used by the quote API (e.g. `stellar`).
    pub quote_id: String,
}

impl Asset {
    pub fn new(symbol: &str, display_name: &str, logo: AssetLogo, quote_id: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            logo,
            quote_id: quote_id.to_string(),
        }
    }

    pub fn unit_price_usd(&self, snapshot: &PriceSnapshot) -> Option<f64> {
        snapshot.price(&self.symbol)
    }
}

/// Immutable set of USD unit prices. Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub prices_by_symbol: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
    pub is_fallback: bool,
}

impl PriceSnapshot {
    pub fn new(prices_by_symbol: HashMap<String, f64>, is_fallback: bool) -> Self {
        Self {
            prices_by_symbol,
            fetched_at: Utc::now(),
            is_fallback,
        }
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices_by_symbol.get(symbol).copied()
    }
}

/// Which of the two amount fields was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::From => Side::To,
            Side::To => Side::From,
        }
    }
}

/// Raw text of both amount fields. An empty string means cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountPair {
    pub from_amount: String,
    pub to_amount: String,
}

impl AmountPair {
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::From => &self.from_amount,
            Side::To => &self.to_amount,
        }
    }

    pub fn set(&mut self, side: Side, value: String) {
        match side {
            Side::From => self.from_amount = value,
            Side::To => self.to_amount = value,
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from_amount, &mut self.to_amount);
    }

    pub fn clear(&mut self) {
        self.from_amount.clear();
        self.to_amount.clear();
    }
}

/// Stellar network the wallet session targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Testnet,
    Public,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Public => "public",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "public" | "mainnet" => Ok(Network::Public),
            other => Err(AppError::Config(format!("unknown network: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlippageMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Soroban,
    Classic,
}

/// Values of the settings panel. Displayed only; nothing enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapSettings {
    pub slippage: SlippageMode,
    pub max_hops: u8,
    pub protocol: Protocol,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            slippage: SlippageMode::Auto,
            max_hops: 2,
            protocol: Protocol::Soroban,
        }
    }
}

impl SwapSettings {
    pub fn toggle_slippage(&mut self) {
        self.slippage = match self.slippage {
            SlippageMode::Auto => SlippageMode::Manual,
            SlippageMode::Manual => SlippageMode::Auto,
        };
    }

    pub fn toggle_protocol(&mut self) {
        self.protocol = match self.protocol {
            Protocol::Soroban => Protocol::Classic,
            Protocol::Classic => Protocol::Soroban,
        };
    }

    /// Parse the raw text of the max-hops input; anything unparseable keeps
    /// the previous value.
    pub fn set_max_hops(&mut self, raw: &str) {
        if let Ok(hops) = raw.trim().parse::<u8>() {
            self.max_hops = hops;
        }
    }
}

/// Result of a simulated swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub from_symbol: String,
    pub to_symbol: String,
    pub from_amount: String,
    pub to_amount: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_pair_swap_and_clear() {
        let mut pair = AmountPair {
            from_amount: "10".into(),
            to_amount: "20".into(),
        };
        pair.swap();
        assert_eq!(pair.get(Side::From), "20");
        assert_eq!(pair.get(Side::To), "10");
        pair.clear();
        assert_eq!(pair, AmountPair::default());
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("TESTNET".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("public".parse::<Network>().unwrap(), Network::Public);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn settings_toggles() {
        let mut settings = SwapSettings::default();
        settings.toggle_slippage();
        settings.toggle_protocol();
        settings.set_max_hops("3");
        settings.set_max_hops("lots");
        assert_eq!(settings.slippage, SlippageMode::Manual);
        assert_eq!(settings.protocol, Protocol::Classic);
        assert_eq!(settings.max_hops, 3);
    }
}
