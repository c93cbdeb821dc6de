use anyhow::{Result, anyhow};
use std::sync::Arc;
use swap_card::{
    config::AppConfig,
    feed::{self, CoinGeckoProvider, PriceFeed},
    models::Side,
    swap::SwapForm,
    utils,
    wallet::{JsonFileStore, SimulatedWallet, WalletSession},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cfg = AppConfig::load()?;
    tracing::info!(
        price_api_url = %cfg.price_api_url,
        refresh_secs = cfg.refresh_interval.as_secs(),
        pair = %format!("{}/{}", cfg.from_symbol, cfg.to_symbol),
        "[INIT] swap-card starting"
    );

    // Wallet session ------------------------------------------------------
    let store = Arc::new(JsonFileStore::open(&cfg.storage_path)?);
    let mut session = WalletSession::restore(store);
    let wallet = SimulatedWallet::new(cfg.wallet_id.as_deref().unwrap_or("freighter"));
    if !session.is_connected() && session.network() != cfg.network {
        session.set_network(cfg.network, &wallet).await;
    }
    if cfg.wallet_id.is_some() && !session.is_connected() {
        // Failure is shown and the user has to reconnect; no retry here.
        if let Err(e) = session.connect(&wallet).await {
            tracing::error!(error = %e, "[INIT] wallet connection failed");
        }
    }

    // Price feed ------------------------------------------------------------
    let provider = Arc::new(CoinGeckoProvider::new(
        &cfg.price_api_url,
        cfg.price_precision,
        cfg.request_timeout,
    )?);
    let price_feed = Arc::new(PriceFeed::new(provider, cfg.price_bounds));
    let mut snapshots = price_feed.subscribe();
    let refresh_task = price_feed.spawn(cfg.refresh_interval);

    // Swap card -------------------------------------------------------------
    let from = feed::find_asset(&cfg.from_symbol)
        .ok_or_else(|| anyhow!("unsupported FROM_SYMBOL {}", cfg.from_symbol))?;
    let to = feed::find_asset(&cfg.to_symbol)
        .ok_or_else(|| anyhow!("unsupported TO_SYMBOL {}", cfg.to_symbol))?;
    let mut form = SwapForm::new(from, to)?;
    form.edit_amount(Side::From, &cfg.demo_amount, &price_feed.current());

    let mut swapped = false;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                form.reprice(&snapshot);
                tracing::info!(
                    from = %form.from_asset().symbol,
                    from_amount = %form.amounts().from_amount,
                    from_usd = %form.usd_caption(Side::From, &snapshot),
                    to = %form.to_asset().symbol,
                    to_amount = %form.amounts().to_amount,
                    fallback = snapshot.is_fallback,
                    "[QUOTE] indicative conversion"
                );

                if session.is_connected() && !swapped {
                    match form.simulate_swap(&session) {
                        Ok(receipt) => tracing::info!(
                            address = %session.short_address().unwrap_or_default(),
                            network = %session.network(),
                            "[SWAP] {} {} -> {} {}",
                            receipt.from_amount,
                            receipt.from_symbol,
                            receipt.to_amount,
                            receipt.to_symbol
                        ),
                        Err(e) => tracing::warn!(error = %e, "[SWAP] simulated swap refused"),
                    }
                    swapped = true;
                    form.edit_amount(Side::From, &cfg.demo_amount, &snapshot);
                }
            }
            _ = &mut shutdown => {
                tracing::info!("[SHUTDOWN] ctrl-c received");
                break;
            }
        }
    }

    refresh_task.cancel();
    Ok(())
}
