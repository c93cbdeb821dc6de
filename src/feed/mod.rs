//! USD price feed for the tracked assets.
//!
//! Responsibilities:
//! • Fetch all tracked prices in one request and sanity-check them.
//! • Publish a wholesale-replaced `PriceSnapshot`, falling back to fixed
//!   constants whenever the fetch fails or looks wrong.
//! • Refresh on a fixed interval from a cancellable background task.

use crate::config::PriceBounds;
use crate::errors::{AppError, Result};
use crate::models::{Asset, AssetLogo, PriceSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub mod coingecko;

pub use coingecko::CoinGeckoProvider;

/// Source of USD spot prices keyed by quote id.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Issue exactly one request for all `ids`.
    async fn fetch_usd(&self, ids: &[&str]) -> Result<HashMap<String, f64>>;
}

/// An asset the feed keeps a price for, with its fixed fallback price.
#[derive(Debug, Clone)]
pub struct TrackedAsset {
    pub asset: Asset,
    pub fallback_usd: f64,
}

/// Assets the card can trade.
pub fn tracked_assets() -> Vec<TrackedAsset> {
    vec![
        TrackedAsset {
            asset: Asset::new(
                "XLM",
                "Stellar Lumens",
                AssetLogo::ImageRef("/tokens/xlm.svg".into()),
                "stellar",
            ),
            fallback_usd: 0.12,
        },
        TrackedAsset {
            asset: Asset::new("USDC", "USD Coin", AssetLogo::Emoji("💵".into()), "usd-coin"),
            fallback_usd: 1.0,
        },
        TrackedAsset {
            asset: Asset::new("EURC", "Euro Coin", AssetLogo::Emoji("💶".into()), "euro-coin"),
            fallback_usd: 1.08,
        },
    ]
}

/// Look up a tracked asset by symbol, case-insensitively.
pub fn find_asset(symbol: &str) -> Option<Asset> {
    tracked_assets()
        .into_iter()
        .map(|t| t.asset)
        .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
}

/// Snapshot built from the fixed fallback prices.
pub fn fallback_snapshot(tracked: &[TrackedAsset]) -> PriceSnapshot {
    let prices = tracked
        .iter()
        .map(|t| (t.asset.symbol.clone(), t.fallback_usd))
        .collect();
    PriceSnapshot::new(prices, true)
}

/// All-or-nothing sanity check: every tracked asset must have a quote inside
/// `bounds`, otherwise the whole fetch is rejected. Returns prices keyed by
/// symbol.
pub fn validate_quotes(
    tracked: &[TrackedAsset],
    quotes: &HashMap<String, f64>,
    bounds: PriceBounds,
) -> Result<HashMap<String, f64>> {
    let mut prices = HashMap::with_capacity(tracked.len());
    for t in tracked {
        let price = *quotes
            .get(&t.asset.quote_id)
            .ok_or_else(|| AppError::MissingPrice(t.asset.symbol.clone()))?;
        if !bounds.contains(price) {
            return Err(AppError::PriceOutOfBounds {
                symbol: t.asset.symbol.clone(),
                price,
            });
        }
        prices.insert(t.asset.symbol.clone(), price);
    }
    Ok(prices)
}

/// Cache holding the freshest known prices.
pub struct PriceFeed {
    provider: Arc<dyn PriceProvider>,
    tracked: Vec<TrackedAsset>,
    bounds: PriceBounds,
    tx: watch::Sender<Arc<PriceSnapshot>>,
}

impl PriceFeed {
    /// Feed over the default tracked assets. Until the first refresh lands
    /// the resident snapshot is the fallback one.
    pub fn new(provider: Arc<dyn PriceProvider>, bounds: PriceBounds) -> Self {
        Self::with_assets(provider, tracked_assets(), bounds)
    }

    pub fn with_assets(
        provider: Arc<dyn PriceProvider>,
        tracked: Vec<TrackedAsset>,
        bounds: PriceBounds,
    ) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(fallback_snapshot(&tracked)));
        Self {
            provider,
            tracked,
            bounds,
            tx,
        }
    }

    pub fn tracked(&self) -> &[TrackedAsset] {
        &self.tracked
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PriceSnapshot>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Arc<PriceSnapshot> {
        self.tx.borrow().clone()
    }

    /// Fetch once and replace the resident snapshot. Never fails: any error
    /// yields the fallback snapshot.
    pub async fn refresh(&self) -> Arc<PriceSnapshot> {
        let ids: Vec<&str> = self
            .tracked
            .iter()
            .map(|t| t.asset.quote_id.as_str())
            .collect();

        let snapshot = match self.provider.fetch_usd(&ids).await {
            Ok(quotes) => match validate_quotes(&self.tracked, &quotes, self.bounds) {
                Ok(prices) => {
                    info!(prices = ?prices, "[FEED] prices refreshed");
                    PriceSnapshot::new(prices, false)
                }
                Err(e) => {
                    warn!(error = %e, "[FEED] quotes rejected, using fallback prices");
                    fallback_snapshot(&self.tracked)
                }
            },
            Err(e) => {
                warn!(error = %e, "[FEED] fetch failed, using fallback prices");
                fallback_snapshot(&self.tracked)
            }
        };

        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Refresh now and then every `interval` until the returned task is
    /// cancelled or dropped.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> RefreshTask {
        let feed = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                feed.refresh().await;
            }
        });
        info!(interval_secs = interval.as_secs(), "[FEED] refresh task started");
        RefreshTask { handle }
    }
}

/// Handle to the periodic refresh. Aborting it drops any in-flight fetch, so
/// its result is never published.
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            self.handle.abort();
            info!("[FEED] refresh task cancelled");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
