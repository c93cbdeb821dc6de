use super::connector::WalletConnector;
use super::store::{KEY_NETWORK, KEY_PUBLIC_KEY, KeyValueStore};
use crate::errors::{AppError, Result};
use crate::models::Network;
use crate::utils::shorten_address;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Wallet connection state, owned by the application shell and passed by
/// reference to whatever needs it.
pub struct WalletSession {
    store: Arc<dyn KeyValueStore>,
    public_key: Option<String>,
    network: Network,
    is_loading: bool,
}

impl WalletSession {
    /// Read the persisted address and network once. A stored address counts
    /// as connected.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let network = match store.get(KEY_NETWORK) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "[WALLET] ignoring stored network");
                Network::default()
            }),
            None => Network::default(),
        };
        let public_key = store.get(KEY_PUBLIC_KEY).filter(|k| !k.is_empty());
        if let Some(key) = &public_key {
            info!(address = %shorten_address(key), %network, "[WALLET] restored session");
        }
        Self {
            store,
            public_key,
            network,
            is_loading: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.public_key.is_some()
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn short_address(&self) -> Option<String> {
        self.public_key.as_deref().map(shorten_address)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Open the selector, fetch the address and persist it. Failures are
    /// returned for the caller to show; nothing is retried.
    pub async fn connect(&mut self, connector: &dyn WalletConnector) -> Result<String> {
        self.is_loading = true;
        let outcome = self.try_connect(connector).await;
        self.is_loading = false;

        match outcome {
            Ok(address) => {
                info!(address = %shorten_address(&address), network = %self.network, "[WALLET] connected");
                Ok(address)
            }
            Err(e) => {
                error!(error = %e, "[WALLET] failed to connect, please try again");
                Err(e)
            }
        }
    }

    async fn try_connect(&mut self, connector: &dyn WalletConnector) -> Result<String> {
        let wallet_id = connector.open_selector().await?;
        info!(wallet_id = %wallet_id, "[WALLET] wallet selected");
        let address = connector.get_address().await?;
        if address.is_empty() {
            return Err(AppError::Wallet("wallet returned an empty address".into()));
        }
        self.store.set(KEY_PUBLIC_KEY, &address)?;
        self.store.set(KEY_NETWORK, self.network.as_str())?;
        self.public_key = Some(address.clone());
        Ok(address)
    }

    /// Drop the connection. Local state and persisted keys are cleared even
    /// when the connector fails.
    pub async fn disconnect(&mut self, connector: &dyn WalletConnector) {
        if let Err(e) = connector.disconnect().await {
            warn!(error = %e, "[WALLET] error disconnecting wallet");
        }
        self.public_key = None;
        for key in [KEY_PUBLIC_KEY, KEY_NETWORK] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "[WALLET] failed to clear stored key");
            }
        }
        info!("[WALLET] disconnected");
    }

    /// Switch networks; an open connection is dropped first.
    pub async fn set_network(&mut self, network: Network, connector: &dyn WalletConnector) {
        if self.is_connected() {
            self.disconnect(connector).await;
        }
        self.network = network;
        if let Err(e) = self.store.set(KEY_NETWORK, network.as_str()) {
            warn!(error = %e, "[WALLET] failed to persist network");
        }
        info!(%network, "[WALLET] network changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::connector::SimulatedWallet;
    use crate::wallet::store::MemoryStore;
    use async_trait::async_trait;

    struct BrokenWallet;

    #[async_trait]
    impl WalletConnector for BrokenWallet {
        async fn open_selector(&self) -> Result<String> {
            Err(AppError::Wallet("modal closed".into()))
        }

        async fn get_address(&self) -> Result<String> {
            Err(AppError::Wallet("no wallet".into()))
        }

        async fn disconnect(&self) -> Result<()> {
            Err(AppError::Wallet("extension gone".into()))
        }
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::default())
    }

    #[tokio::test]
    async fn connect_persists_address_and_network() {
        let store = store();
        let mut session = WalletSession::restore(store.clone());
        assert!(!session.is_connected());

        let wallet = SimulatedWallet::new("freighter");
        let address = session.connect(&wallet).await.unwrap();

        assert!(session.is_connected());
        assert!(!session.is_loading());
        assert_eq!(store.get(KEY_PUBLIC_KEY), Some(address));
        assert_eq!(store.get(KEY_NETWORK).as_deref(), Some("testnet"));
    }

    #[tokio::test]
    async fn restore_reads_stored_state() {
        let store = store();
        store.set(KEY_PUBLIC_KEY, "GBZXN7PIRZGNMHGA7MUUUF4GWPY5AYPV6LY4UV2GL6VJGIQRXFDNMADI").unwrap();
        store.set(KEY_NETWORK, "public").unwrap();

        let session = WalletSession::restore(store);
        assert!(session.is_connected());
        assert_eq!(session.network(), Network::Public);
        assert_eq!(session.short_address().as_deref(), Some("GBZXN7...MADI"));
    }

    #[tokio::test]
    async fn failed_connect_is_surfaced_and_leaves_state_clean() {
        let store = store();
        let mut session = WalletSession::restore(store.clone());
        let err = session.connect(&BrokenWallet).await.unwrap_err();
        assert!(matches!(err, AppError::Wallet(_)));
        assert!(!session.is_connected());
        assert!(!session.is_loading());
        assert!(store.get(KEY_PUBLIC_KEY).is_none());
    }

    #[tokio::test]
    async fn unavailable_wallet_cannot_connect() {
        let mut session = WalletSession::restore(store());
        assert!(session.connect(&SimulatedWallet::new("hana")).await.is_err());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn disconnect_clears_even_when_connector_errors() {
        let store = store();
        store.set(KEY_PUBLIC_KEY, "GABCDEFGHIJKLMNOP").unwrap();
        store.set(KEY_NETWORK, "testnet").unwrap();
        let mut session = WalletSession::restore(store.clone());

        session.disconnect(&BrokenWallet).await;
        assert!(!session.is_connected());
        assert!(store.get(KEY_PUBLIC_KEY).is_none());
        assert!(store.get(KEY_NETWORK).is_none());
    }

    #[tokio::test]
    async fn switching_network_disconnects() {
        let store = store();
        let wallet = SimulatedWallet::new("albedo");
        let mut session = WalletSession::restore(store.clone());
        session.connect(&wallet).await.unwrap();

        session.set_network(Network::Public, &wallet).await;
        assert_eq!(session.network(), Network::Public);
        assert!(!session.is_connected());
        assert!(store.get(KEY_PUBLIC_KEY).is_none());
        assert_eq!(store.get(KEY_NETWORK).as_deref(), Some("public"));
    }
}
