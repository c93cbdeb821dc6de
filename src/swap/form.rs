use super::converter::{convert, parse_amount, usd_value};
use crate::errors::{AppError, Result};
use crate::models::{AmountPair, Asset, PriceSnapshot, Side, SwapReceipt, SwapSettings};
use crate::utils::format_usd;
use crate::wallet::WalletSession;
use bigdecimal::BigDecimal;
use tracing::{debug, info};

/// State of the swap card: the active pair, both amount fields and the
/// settings panel.
#[derive(Debug, Clone)]
pub struct SwapForm {
    from: Asset,
    to: Asset,
    amounts: AmountPair,
    /// Side whose text the user typed; the other side is derived.
    last_edited: Option<Side>,
    settings: SwapSettings,
}

impl SwapForm {
    pub fn new(from: Asset, to: Asset) -> Result<Self> {
        if from.symbol == to.symbol {
            return Err(AppError::Swap(format!(
                "cannot swap {} for itself",
                from.symbol
            )));
        }
        Ok(Self {
            from,
            to,
            amounts: AmountPair::default(),
            last_edited: None,
            settings: SwapSettings::default(),
        })
    }

    pub fn from_asset(&self) -> &Asset {
        &self.from
    }

    pub fn to_asset(&self) -> &Asset {
        &self.to
    }

    pub fn asset(&self, side: Side) -> &Asset {
        match side {
            Side::From => &self.from,
            Side::To => &self.to,
        }
    }

    pub fn amounts(&self) -> &AmountPair {
        &self.amounts
    }

    pub fn last_edited(&self) -> Option<Side> {
        self.last_edited
    }

    pub fn settings(&self) -> &SwapSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SwapSettings {
        &mut self.settings
    }

    /// The user typed `raw` into `side`; overwrite the other side.
    pub fn edit_amount(&mut self, side: Side, raw: &str, snapshot: &PriceSnapshot) {
        self.amounts.set(side, raw.to_string());
        self.last_edited = Some(side);
        self.recompute(snapshot);
    }

    /// Pick a new asset for `side`. Choosing the asset already on the other
    /// side flips the direction instead.
    pub fn select_asset(&mut self, side: Side, asset: Asset, snapshot: &PriceSnapshot) {
        if self.asset(side).symbol == asset.symbol {
            return;
        }
        if self.asset(side.opposite()).symbol == asset.symbol {
            self.swap_direction();
            return;
        }
        match side {
            Side::From => self.from = asset,
            Side::To => self.to = asset,
        }
        self.recompute(snapshot);
    }

    /// Exchange the assets and the amounts as they are. Nothing is
    /// recomputed, so the displayed numbers are relabeled, not re-derived.
    pub fn swap_direction(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.amounts.swap();
        self.last_edited = self.last_edited.map(Side::opposite);
        debug!(from = %self.from.symbol, to = %self.to.symbol, "[SWAP] direction swapped");
    }

    /// Re-derive the non-edited side against a new snapshot.
    pub fn reprice(&mut self, snapshot: &PriceSnapshot) {
        self.recompute(snapshot);
    }

    fn recompute(&mut self, snapshot: &PriceSnapshot) {
        let Some(edited) = self.last_edited else {
            return;
        };
        let derived = convert(
            self.amounts.get(edited),
            edited,
            &self.from,
            &self.to,
            snapshot,
        );
        self.amounts.set(edited.opposite(), derived);
    }

    /// `~1,234.56` caption under an amount field; empty when the amount is
    /// not a number.
    pub fn usd_caption(&self, side: Side, snapshot: &PriceSnapshot) -> String {
        match usd_value(self.amounts.get(side), self.asset(side), snapshot) {
            Some(value) => format!("~{}", format_usd(value)),
            None => String::new(),
        }
    }

    /// Pretend to execute the swap. Needs a connected wallet and a positive
    /// amount; on success both fields are cleared.
    pub fn simulate_swap(&mut self, session: &WalletSession) -> Result<SwapReceipt> {
        let address = session
            .public_key()
            .ok_or_else(|| AppError::Wallet("connect a wallet before swapping".into()))?;

        let positive = parse_amount(&self.amounts.from_amount)
            .is_some_and(|amount| amount > BigDecimal::from(0));
        if !positive || self.amounts.to_amount.is_empty() {
            return Err(AppError::Swap("enter an amount to swap".into()));
        }

        let receipt = SwapReceipt {
            from_symbol: self.from.symbol.clone(),
            to_symbol: self.to.symbol.clone(),
            from_amount: self.amounts.from_amount.clone(),
            to_amount: self.amounts.to_amount.clone(),
            address: address.to_string(),
        };
        info!(
            from = %receipt.from_symbol,
            to = %receipt.to_symbol,
            from_amount = %receipt.from_amount,
            to_amount = %receipt.to_amount,
            slippage = ?self.settings.slippage,
            max_hops = self.settings.max_hops,
            protocol = ?self.settings.protocol,
            "[SWAP] simulated swap"
        );

        self.amounts.clear();
        self.last_edited = None;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::find_asset;
    use crate::wallet::{MemoryStore, SimulatedWallet};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn snapshot() -> PriceSnapshot {
        let prices: HashMap<String, f64> = [("XLM", 0.125), ("USDC", 0.49), ("EURC", 1.0)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        PriceSnapshot::new(prices, false)
    }

    fn asset(symbol: &str) -> Asset {
        find_asset(symbol).expect("tracked asset")
    }

    fn form() -> SwapForm {
        SwapForm::new(asset("XLM"), asset("USDC")).unwrap()
    }

    #[test]
    fn rejects_identical_pair() {
        assert!(SwapForm::new(asset("XLM"), asset("XLM")).is_err());
    }

    #[test]
    fn editing_either_side_derives_the_other() {
        let snap = snapshot();
        let mut form = form();

        form.edit_amount(Side::From, "100", &snap);
        assert_eq!(form.amounts().to_amount, "25.51");

        form.edit_amount(Side::To, "25.51", &snap);
        assert_eq!(form.amounts().from_amount, "100.00");
        assert_eq!(form.last_edited(), Some(Side::To));

        form.edit_amount(Side::From, "", &snap);
        assert_eq!(form.amounts().to_amount, "");
    }

    #[test]
    fn swap_direction_relabels_without_recompute() {
        let snap = snapshot();
        let mut form = form();
        form.edit_amount(Side::From, "10", &snap);
        form.amounts.to_amount = "20".into();

        form.swap_direction();
        assert_eq!(form.from_asset().symbol, "USDC");
        assert_eq!(form.to_asset().symbol, "XLM");
        assert_eq!(form.amounts().from_amount, "20");
        assert_eq!(form.amounts().to_amount, "10");
        assert_eq!(form.last_edited(), Some(Side::To));
    }

    #[test]
    fn selecting_new_asset_recomputes_from_edited_side() {
        let snap = snapshot();
        let mut form = form();
        form.edit_amount(Side::From, "100", &snap);

        form.select_asset(Side::To, asset("EURC"), &snap);
        assert_eq!(form.to_asset().symbol, "EURC");
        assert_eq!(form.amounts().to_amount, "12.50");
    }

    #[test]
    fn selecting_other_sides_asset_flips_direction() {
        let snap = snapshot();
        let mut form = form();
        form.edit_amount(Side::From, "100", &snap);

        form.select_asset(Side::From, asset("USDC"), &snap);
        assert_eq!(form.from_asset().symbol, "USDC");
        assert_eq!(form.to_asset().symbol, "XLM");
        assert_eq!(form.amounts().from_amount, "25.51");
        assert_eq!(form.amounts().to_amount, "100");
        assert_ne!(form.from_asset().symbol, form.to_asset().symbol);
    }

    #[test]
    fn reprice_follows_new_snapshot() {
        let mut form = form();
        form.edit_amount(Side::From, "100", &snapshot());

        let mut prices = snapshot().prices_by_symbol;
        prices.insert("USDC".into(), 1.0);
        form.reprice(&PriceSnapshot::new(prices, false));
        assert_eq!(form.amounts().to_amount, "12.50");
    }

    #[test]
    fn usd_caption_formats_value() {
        let snap = snapshot();
        let mut form = form();
        form.edit_amount(Side::From, "100000", &snap);
        assert_eq!(form.usd_caption(Side::From, &snap), "~12,500.00");
        form.edit_amount(Side::From, "x", &snap);
        assert_eq!(form.usd_caption(Side::From, &snap), "");
    }

    #[test]
    fn usd_caption_is_empty_when_value_overflows() {
        let prices: HashMap<String, f64> = [("XLM", 5.0), ("USDC", 1.0)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        let snap = PriceSnapshot::new(prices, false);
        let mut form = form();
        form.edit_amount(Side::From, "1e308", &snap);
        assert_eq!(form.usd_caption(Side::From, &snap), "");
        form.edit_amount(Side::From, "1e400", &snap);
        assert_eq!(form.amounts().to_amount, "");
        assert_eq!(form.usd_caption(Side::From, &snap), "");
    }

    #[tokio::test]
    async fn simulated_swap_requires_wallet_and_clears_amounts() {
        let snap = snapshot();
        let mut form = form();
        form.edit_amount(Side::From, "100", &snap);

        let mut session = WalletSession::restore(Arc::new(MemoryStore::default()));
        let err = form.simulate_swap(&session).unwrap_err();
        assert!(matches!(err, AppError::Wallet(_)));
        assert_eq!(form.amounts().from_amount, "100");

        session
            .connect(&SimulatedWallet::new("freighter"))
            .await
            .unwrap();
        let receipt = form.simulate_swap(&session).unwrap();
        assert_eq!(receipt.from_amount, "100");
        assert_eq!(receipt.to_amount, "25.51");
        assert_eq!(receipt.from_symbol, "XLM");
        assert_eq!(Some(receipt.address.as_str()), session.public_key());
        assert_eq!(form.amounts(), &AmountPair::default());
    }

    #[tokio::test]
    async fn simulated_swap_rejects_empty_amount() {
        let store = Arc::new(MemoryStore::default());
        let mut session = WalletSession::restore(store);
        session
            .connect(&SimulatedWallet::new("albedo"))
            .await
            .unwrap();

        let mut form = form();
        assert!(matches!(
            form.simulate_swap(&session),
            Err(AppError::Swap(_))
        ));
        form.edit_amount(Side::From, "0", &snapshot());
        assert!(form.simulate_swap(&session).is_err());
    }
}
