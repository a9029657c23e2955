// Storage layer: sled-backed wallet database and account store

mod wallet_db;
mod account_store;

pub use wallet_db::{WalletDb, OpenMode};
pub use account_store::{AccountStore, NamedAccounts, INDEX_KEY};
