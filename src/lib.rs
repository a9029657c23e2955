// Minimal cryptocurrency wallet core
// Base58Check keys and addresses, sled-backed accounts, UTXO selection and signing

pub mod core;
pub mod error;
pub mod config;
pub mod storage;
pub mod wallet;
pub mod cli;

// Re-exports for convenience
pub use self::core::{Amount, Hash256, Transaction, TxInput, TxOutput, Script};
pub use error::{WalletError, Result};
pub use config::WalletConfig;
pub use storage::{AccountStore, WalletDb, OpenMode};
pub use wallet::{Wallet, KeyManager, KeySource, SubAccount, ReceivedOutput, Account};
pub use cli::{Cli, CliHandler};
