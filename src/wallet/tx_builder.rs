// Transaction builder and signer

use crate::core::{Amount, Hash256, Script, Transaction, TxInput, TxOutput, SIGHASH_ALL};
use crate::error::{Result, WalletError};
use crate::wallet::{Account, CoinSelector, FeePolicy, KeyManager, ReceivedOutput, SubAccount};

/// An output consumed by a built transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpentOutput {
    pub account: String,
    pub address: String,
    pub txhash: Hash256,
    pub n: u32,
    pub value: Amount,
}

/// A fully signed transaction plus what it consumed
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub tx: Transaction,
    pub fee: Amount,
    pub spent: Vec<SpentOutput>,
}

// Input waiting for its signature
struct PendingInput<'a> {
    account: &'a str,
    owner: &'a SubAccount,
    received: &'a ReceivedOutput,
}

/// Transaction builder
pub struct TransactionBuilder<'a> {
    keys: &'a KeyManager,
    fee: &'a dyn FeePolicy,
}

impl<'a> TransactionBuilder<'a> {
    /// Create a new transaction builder
    pub fn new(keys: &'a KeyManager, fee: &'a dyn FeePolicy) -> Self {
        Self { keys, fee }
    }

    /// Build and sign a payment of `amount` to `to`, funded from `accounts`
    /// (visited in the given order).
    pub fn build(
        &self,
        accounts: &[(String, Account)],
        to: &str,
        amount: Amount,
    ) -> Result<BuiltTransaction> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount("amount must be non-zero".to_string()));
        }

        let candidates = accounts
            .iter()
            .flat_map(|(name, account)| account.values().map(move |sub| (name.as_str(), sub)));
        let selection = CoinSelector::select(candidates, amount, self.fee)?;

        // Payment output
        let recipient_script = self.keys.address_to_script_pubkey(to)?;
        let mut tx = Transaction::new(Vec::new(), vec![TxOutput::new(amount, recipient_script)]);

        // Inputs from the selected subaccounts
        let mut pending = Vec::new();
        let mut value_in: Amount = 0;
        'funding: for funding in &selection.selected {
            let owner_script = self.keys.address_to_script_pubkey(&funding.subaccount.address)?;

            for received in funding.subaccount.unspent() {
                Self::check_received(received, &owner_script)?;

                tx.inputs.push(TxInput::new(received.txhash, received.n, Vec::new()));
                pending.push(PendingInput {
                    account: funding.account,
                    owner: funding.subaccount,
                    received,
                });
                value_in = value_in.saturating_add(received.value);

                if value_in >= amount.saturating_add(self.fee.fee(Some(&tx))) {
                    break 'funding;
                }
            }
        }

        let fee = self.fee.fee(Some(&tx));
        let need = amount.saturating_add(fee);
        if value_in < need {
            return Err(WalletError::InsufficientFunds { have: value_in, need });
        }

        // Change output (if any) back to the first funding address
        let excess = value_in - tx.total_output_value();
        if excess > fee {
            let change_address = &selection.selected[0].subaccount.address;
            let change_script = self.keys.address_to_script_pubkey(change_address)?;
            tx.outputs.push(TxOutput::new(excess - fee, change_script));
        }

        self.sign_transaction(&mut tx, &pending)?;

        log::info!(
            "Built transaction {} with {} input(s), {} output(s), fee {}",
            tx.txid(),
            tx.inputs.len(),
            tx.outputs.len(),
            fee
        );

        let spent = pending
            .iter()
            .map(|p| SpentOutput {
                account: p.account.to_string(),
                address: p.owner.address.clone(),
                txhash: p.received.txhash,
                n: p.received.n,
                value: p.received.value,
            })
            .collect();

        Ok(BuiltTransaction { tx, fee, spent })
    }

    // A recorded output must pay the owning address and carry value
    fn check_received(received: &ReceivedOutput, owner_script: &[u8]) -> Result<()> {
        let reason = if received.script_pubkey.is_empty() {
            "missing scriptPubKey"
        } else if received.script_pubkey != owner_script {
            "scriptPubKey does not pay the owning address"
        } else if received.value == 0 {
            "zero value"
        } else {
            return Ok(());
        };
        Err(WalletError::MalformedUtxo {
            txhash: received.txhash,
            n: received.n,
            reason: reason.to_string(),
        })
    }

    /// Sign every input with the key of the subaccount that owns its output
    fn sign_transaction(&self, tx: &mut Transaction, pending: &[PendingInput]) -> Result<()> {
        // All hashes are taken over the unsigned transaction
        let sighashes: Vec<Hash256> = pending
            .iter()
            .enumerate()
            .map(|(i, p)| tx.signature_hash(i, &p.received.script_pubkey, SIGHASH_ALL))
            .collect();

        let mut script_sigs = Vec::with_capacity(pending.len());
        for (p, sighash) in pending.iter().zip(&sighashes) {
            let keypair = self.keys.keypair_from_encoded(&p.owner.private_key)?;
            let pubkey = keypair.pubkey_bytes();
            if hex::encode(&pubkey) != p.owner.public_key {
                return Err(WalletError::KeyDerivation(format!(
                    "private key does not match public key of {}",
                    p.owner.address
                )));
            }

            let signature = self.keys.sign(&keypair, sighash);
            script_sigs.push(Script::p2pkh_script_sig(&signature, SIGHASH_ALL, &pubkey));
        }

        for (input, script_sig) in tx.inputs.iter_mut().zip(script_sigs) {
            input.script_sig = script_sig;
        }

        Ok(())
    }
}
