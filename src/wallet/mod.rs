//! Wallet connection session.
//!
//! Wraps an external wallet collaborator behind [`WalletConnector`] and keeps
//! the connected address and network in a [`KeyValueStore`].

pub mod connector;
pub mod session;
pub mod store;

pub use connector::{SimulatedWallet, WALLET_CATALOG, WalletConnector, WalletOption, select_wallet};
pub use session::WalletSession;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
