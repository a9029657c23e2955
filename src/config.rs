// Wallet configuration

use crate::error::{Result, WalletError};
use crate::storage::INDEX_KEY;
use crate::wallet::PRIVATE_KEY_VERSION_OFFSET;
use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Account used when a caller names none
pub const DEFAULT_ACCOUNT: &str = "account";

const WALLET_FILE: &str = "wallet.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub data_dir: PathBuf,
    /// Address version byte (0 for Bitcoin mainnet, 111 for testnet)
    pub address_version: u8,
    pub default_account: String,
}

impl WalletConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Path of the wallet database
    pub fn wallet_path(&self) -> PathBuf {
        self.data_dir.join(WALLET_FILE)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address_version >= PRIVATE_KEY_VERSION_OFFSET {
            return Err(WalletError::Config(format!(
                "address version must be below {}, got {}",
                PRIVATE_KEY_VERSION_OFFSET, self.address_version
            )));
        }
        if self.default_account.is_empty() || self.default_account == INDEX_KEY {
            return Err(WalletError::Config(format!(
                "invalid default account name: {:?}",
                self.default_account
            )));
        }
        Ok(())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            address_version: 0,
            default_account: DEFAULT_ACCOUNT.to_string(),
        }
    }
}
