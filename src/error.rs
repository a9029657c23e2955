// Wallet error types

use crate::core::Hash256;
use thiserror::Error;

/// Errors produced by wallet operations.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Input is not valid base58 or decodes to too few bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Base58Check checksum did not match the payload.
    #[error("checksum mismatch")]
    Checksum,

    /// Base58Check version byte differs from the expected one.
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u8, found: u8 },

    /// The wallet database has no account index yet.
    #[error("wallet not initialized")]
    NotInitialized,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("invalid account name: {0:?}")]
    InvalidAccountName(String),

    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },

    /// A recorded output cannot be spent as recorded.
    #[error("malformed UTXO {txhash}:{n}: {reason}")]
    MalformedUtxo {
        txhash: Hash256,
        n: u32,
        reason: String,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("key derivation: {0}")]
    KeyDerivation(String),

    /// Key-value store failure (open, read, write, flush).
    #[error("store I/O: {0}")]
    StoreIo(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Balance oracle or received-output feed failed.
    #[error("chain index: {0}")]
    ChainIndex(String),

    #[error("config: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sled::Error> for WalletError {
    fn from(e: sled::Error) -> Self {
        WalletError::StoreIo(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_insufficient_funds() {
        let e = WalletError::InsufficientFunds { have: 4, need: 6 };
        assert_eq!(e.to_string(), "insufficient funds: have 4, need 6");
    }

    #[test]
    fn test_display_version_mismatch() {
        let e = WalletError::VersionMismatch { expected: 0, found: 111 };
        assert_eq!(e.to_string(), "version mismatch: expected 0, found 111");
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let wallet: WalletError = err.into();
        assert!(matches!(wallet, WalletError::Serialization(_)));
    }
}
