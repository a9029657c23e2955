// Wallet: keys, accounts, coin selection and transaction building

mod account;
mod keys;
mod fee;
mod coin_selection;
mod tx_builder;
mod chain_index;
mod manager;

pub use account::{Account, SubAccount, ReceivedOutput, account_balance};
pub use keys::{KeyManager, KeyPair, KeySource, PRIVATE_KEY_VERSION_OFFSET};
pub use fee::{FeePolicy, FlatFee, SizeFee};
pub use coin_selection::{CoinSelector, Selection, Funding};
pub use tx_builder::{TransactionBuilder, BuiltTransaction, SpentOutput};
pub use chain_index::{ChainIndex, ReceivedBatch, SnapshotIndex};
pub use manager::Wallet;
