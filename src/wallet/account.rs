// Account records persisted in the wallet database

use crate::core::{Amount, Hash256};
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// An output paid to one of our addresses, as reported by the chain index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedOutput {
    pub txhash: Hash256,
    pub n: u32,
    pub value: Amount,
    #[serde(with = "hex::serde")]
    pub script_pubkey: Vec<u8>,
    /// Set once a built transaction consumes this output
    #[serde(default)]
    pub spent: bool,
}

impl ReceivedOutput {
    pub fn new(txhash: Hash256, n: u32, value: Amount, script_pubkey: Vec<u8>) -> Self {
        Self {
            txhash,
            n,
            value,
            script_pubkey,
            spent: false,
        }
    }

    /// Whether this record refers to the output `(txhash, n)`
    pub fn is_outpoint(&self, txhash: &Hash256, n: u32) -> bool {
        self.txhash == *txhash && self.n == n
    }
}

/// One address with its keys and chain state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccount {
    /// Base58Check address
    pub address: String,
    /// Hex-encoded public key
    pub public_key: String,
    /// Base58Check (WIF-style) private key
    pub private_key: String,
    pub balance: Amount,
    /// Last block height seen by the chain index
    pub height: u32,
    pub received: Vec<ReceivedOutput>,
}

impl SubAccount {
    /// Received outputs not yet consumed, in recorded order
    pub fn unspent(&self) -> impl Iterator<Item = &ReceivedOutput> {
        self.received.iter().filter(|r| !r.spent)
    }

    /// Append outputs that are not already recorded.
    /// Returns how many were added.
    pub fn record_received(&mut self, outputs: Vec<ReceivedOutput>) -> usize {
        let mut added = 0;
        for output in outputs {
            if !self.received.iter().any(|r| r.is_outpoint(&output.txhash, output.n)) {
                self.received.push(output);
                added += 1;
            }
        }
        added
    }

    /// Total value of the unspent received outputs
    pub fn unspent_value(&self) -> Amount {
        self.unspent().fold(0, |total, r| total.saturating_add(r.value))
    }

    /// Set the balance from a chain index figure.
    ///
    /// Outputs consumed by a send stay unspent on chain until it confirms,
    /// so the balance is capped at the value of the outputs not marked spent.
    pub fn apply_chain_balance(&mut self, chain_balance: Amount) {
        self.balance = chain_balance.min(self.unspent_value());
    }

    /// Mark `(txhash, n)` spent and deduct its value from the balance.
    /// Returns false if the output is unknown or already spent.
    pub fn mark_spent(&mut self, txhash: &Hash256, n: u32) -> bool {
        let Some(output) = self
            .received
            .iter_mut()
            .find(|r| r.is_outpoint(txhash, n) && !r.spent)
        else {
            return false;
        };
        output.spent = true;
        self.balance = self.balance.saturating_sub(output.value);
        true
    }
}

/// Address -> SubAccount. Iteration order is address order.
pub type Account = BTreeMap<String, SubAccount>;

/// Sum of subaccount balances
pub fn account_balance(account: &Account) -> Amount {
    account
        .values()
        .fold(0, |total: Amount, sub| total.saturating_add(sub.balance))
}
