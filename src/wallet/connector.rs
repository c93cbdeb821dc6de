use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// External wallet collaborator. Discovery, keys and signing live behind it.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Let the user pick a wallet; returns its id.
    async fn open_selector(&self) -> Result<String>;
    /// Public address of the selected wallet.
    async fn get_address(&self) -> Result<String>;
    async fn disconnect(&self) -> Result<()>;
}

/// Entry of the wallet picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletOption {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub available: bool,
    pub description: &'static str,
}

pub const WALLET_CATALOG: &[WalletOption] = &[
    WalletOption {
        id: "freighter",
        name: "Freighter",
        icon: "🔐",
        available: true,
        description: "Browser extension wallet",
    },
    WalletOption {
        id: "albedo",
        name: "Albedo",
        icon: "🔷",
        available: true,
        description: "Web-based wallet",
    },
    WalletOption {
        id: "xbull",
        name: "xBull",
        icon: "🐂",
        available: true,
        description: "Mobile wallet",
    },
    WalletOption {
        id: "hot",
        name: "HOT Wallet",
        icon: "🔥",
        available: true,
        description: "Hardware wallet",
    },
    WalletOption {
        id: "rabet",
        name: "Rabet",
        icon: "🐰",
        available: false,
        description: "Browser extension (coming soon)",
    },
    WalletOption {
        id: "lobstr",
        name: "LOBSTR",
        icon: "🌊",
        available: false,
        description: "Mobile wallet (coming soon)",
    },
    WalletOption {
        id: "hana",
        name: "Hana Wallet",
        icon: "🌸",
        available: false,
        description: "Mobile wallet (coming soon)",
    },
];

/// Resolve a picker choice. Unknown and unavailable wallets are refused.
pub fn select_wallet(id: &str) -> Result<&'static WalletOption> {
    let option = WALLET_CATALOG
        .iter()
        .find(|w| w.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| AppError::Wallet(format!("unknown wallet: {id}")))?;
    if !option.available {
        return Err(AppError::Wallet(format!("{} is not available", option.name)));
    }
    Ok(option)
}

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// In-process connector that "selects" a preconfigured wallet and derives a
/// deterministic `G...` address from its id. Used by the binary and tests.
#[derive(Debug)]
pub struct SimulatedWallet {
    choice: String,
    selected: Mutex<Option<&'static WalletOption>>,
}

impl SimulatedWallet {
    pub fn new(choice: &str) -> Self {
        Self {
            choice: choice.to_string(),
            selected: Mutex::new(None),
        }
    }

    pub fn selected(&self) -> Option<&'static WalletOption> {
        self.selected.lock().ok().and_then(|s| *s)
    }

    /// 56-character, base32-alphabet address seeded from the wallet id.
    fn derive_address(id: &str) -> String {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in id.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0100_0000_01b3);
        }
        let mut address = String::with_capacity(56);
        address.push('G');
        while address.len() < 56 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            address.push(char::from(BASE32_ALPHABET[(state % 32) as usize]));
        }
        address
    }
}

#[async_trait]
impl WalletConnector for SimulatedWallet {
    async fn open_selector(&self) -> Result<String> {
        let option = select_wallet(&self.choice)?;
        if let Ok(mut selected) = self.selected.lock() {
            *selected = Some(option);
        }
        Ok(option.id.to_string())
    }

    async fn get_address(&self) -> Result<String> {
        let option = self
            .selected()
            .ok_or_else(|| AppError::Wallet("no wallet selected".into()))?;
        Ok(Self::derive_address(option.id))
    }

    async fn disconnect(&self) -> Result<()> {
        if let Ok(mut selected) = self.selected.lock() {
            *selected = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_refuses_unavailable_and_unknown() {
        assert_eq!(select_wallet("Freighter").unwrap().id, "freighter");
        assert!(matches!(select_wallet("lobstr"), Err(AppError::Wallet(_))));
        assert!(matches!(select_wallet("metamask"), Err(AppError::Wallet(_))));
    }

    #[tokio::test]
    async fn simulated_wallet_flow() {
        let wallet = SimulatedWallet::new("xbull");
        assert!(wallet.get_address().await.is_err());

        assert_eq!(wallet.open_selector().await.unwrap(), "xbull");
        let address = wallet.get_address().await.unwrap();
        assert_eq!(address.len(), 56);
        assert!(address.starts_with('G'));
        assert_eq!(address, wallet.get_address().await.unwrap());

        wallet.disconnect().await.unwrap();
        assert!(wallet.selected().is_none());
    }

    #[test]
    fn addresses_differ_per_wallet() {
        assert_ne!(
            SimulatedWallet::derive_address("freighter"),
            SimulatedWallet::derive_address("albedo")
        );
    }
}
