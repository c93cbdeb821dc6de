use super::PriceProvider;
use crate::errors::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// One entry of the `/simple/price` response. The 24h change is requested
/// alongside the price but not used.
#[derive(Debug, Deserialize)]
struct QuoteEntry {
    usd: Option<f64>,
    #[serde(default)]
    #[allow(dead_code)]
    usd_24h_change: Option<f64>,
}

/// CoinGecko-style `/simple/price` client.
#[derive(Debug, Clone)]
pub struct CoinGeckoProvider {
    client: Client,
    base: Url,
    precision: u8,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, precision: u8, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            precision,
        })
    }

    fn quote_url(&self, ids: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("ids", &ids.join(","))
            .append_pair("vs_currencies", "usd")
            .append_pair("include_24hr_change", "true")
            .append_pair("precision", &self.precision.to_string());
        url
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_usd(&self, ids: &[&str]) -> Result<HashMap<String, f64>> {
        let url = self.quote_url(ids);
        debug!(%url, "[FEED] requesting quotes");
        let body = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        parse_quotes(&body)
    }
}

/// Parse `{ "stellar": {"usd": 0.12, "usd_24h_change": -1.3}, ... }` into
/// `id -> usd`. Entries without a `usd` field are left out.
fn parse_quotes(body: &[u8]) -> Result<HashMap<String, f64>> {
    let parsed: HashMap<String, QuoteEntry> = serde_json::from_slice(body)?;
    Ok(parsed
        .into_iter()
        .filter_map(|(id, entry)| entry.usd.map(|usd| (id, usd)))
        .collect())
}
