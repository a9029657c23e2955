//! Wallet facade: the operations exposed to the CLI and embedding callers.
//!
//! Owns the configuration, the key manager (and with it the single
//! secp256k1 context) and the account store. Each call is synchronous and
//! runs inside exactly one database session.

use crate::config::WalletConfig;
use crate::core::{Amount, Transaction};
use crate::error::{Result, WalletError};
use crate::storage::{AccountStore, NamedAccounts};
use crate::wallet::{
    account_balance, Account, ChainIndex, FeePolicy, KeyManager, KeySource, SpentOutput,
    TransactionBuilder,
};

pub struct Wallet {
    config: WalletConfig,
    keys: KeyManager,
    store: AccountStore,
}

impl Wallet {
    pub fn new(config: WalletConfig) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)?;
        let keys = KeyManager::new(config.address_version)?;
        let store = AccountStore::new(config.wallet_path());
        Ok(Self { config, keys, store })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    fn account_name<'a>(&'a self, account: Option<&'a str>) -> &'a str {
        account.unwrap_or(&self.config.default_account)
    }

    /// Create the wallet if it has no account index yet
    pub fn initialize(&self) -> Result<bool> {
        self.store.initialize(&self.keys, &self.config.default_account)
    }

    /// Returns `(public_key, address)`
    pub fn get_new_address(&self, account: Option<&str>) -> Result<(String, String)> {
        self.store.get_new_address(&self.keys, self.account_name(account))
    }

    /// Add a key from a passphrase or an encoded private key.
    /// Returns `(public_key, address)`.
    pub fn import_key(&self, account: Option<&str>, source: &KeySource) -> Result<(String, String)> {
        let keypair = self.keys.keypair_from_source(source)?;
        let subaccount = self.keys.new_subaccount(&keypair);
        self.store.add_subaccount(self.account_name(account), subaccount)
    }

    pub fn get_account(&self, account: Option<&str>) -> Result<Account> {
        self.store.get_account(self.account_name(account))
    }

    pub fn get_accounts(&self) -> Result<NamedAccounts> {
        self.store.get_accounts()
    }

    /// Refresh every address of an account from the chain index, persist
    /// the result and return the account total.
    ///
    /// Outputs already marked spent never count towards a balance, even
    /// while the chain still reports them.
    ///
    /// A chain index failure aborts the refresh; nothing is written.
    pub fn get_balance(&self, account: Option<&str>, chain: &dyn ChainIndex) -> Result<Amount> {
        let name = self.account_name(account);
        self.store.update(|accounts| {
            let (_, account) = accounts
                .iter_mut()
                .find(|(n, _)| n == name)
                .ok_or_else(|| WalletError::AccountNotFound(name.to_string()))?;

            for subaccount in account.values_mut() {
                let chain_balance = chain.get_balance(&subaccount.address)?;
                let batch = chain.received_outputs(&subaccount.address, subaccount.height)?;
                let added = subaccount.record_received(batch.outputs);
                subaccount.height = subaccount.height.max(batch.height);
                subaccount.apply_chain_balance(chain_balance);
                if added > 0 {
                    log::debug!("{} new output(s) for {}", added, subaccount.address);
                }
            }

            Ok(account_balance(account))
        })
    }

    /// Build and sign a payment, marking the consumed outputs spent.
    ///
    /// The transaction is returned only if the spent markers were
    /// persisted. Broadcasting is left to the caller.
    pub fn send_to_address(&self, to: &str, amount: Amount, fee: &dyn FeePolicy) -> Result<Transaction> {
        self.store.update(|accounts| {
            let built = TransactionBuilder::new(&self.keys, fee).build(accounts, to, amount)?;
            mark_spent(accounts, &built.spent)?;
            log::info!("Sending {} to {} (fee {})", amount, to, built.fee);
            Ok(built.tx)
        })
    }
}

fn mark_spent(accounts: &mut NamedAccounts, spent: &[SpentOutput]) -> Result<()> {
    for output in spent {
        let subaccount = accounts
            .iter_mut()
            .find(|(name, _)| *name == output.account)
            .and_then(|(_, account)| account.get_mut(&output.address))
            .ok_or_else(|| WalletError::AccountNotFound(output.account.clone()))?;

        if !subaccount.mark_spent(&output.txhash, output.n) {
            return Err(WalletError::MalformedUtxo {
                txhash: output.txhash,
                n: output.n,
                reason: "output already spent".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{hash256, Hash256};
    use crate::wallet::{FlatFee, ReceivedBatch, ReceivedOutput};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockChain {
        outputs: HashMap<String, Vec<ReceivedOutput>>,
        height: u32,
        fail: bool,
    }

    impl MockChain {
        fn fund(&mut self, address: &str, script_pubkey: Vec<u8>, values: &[Amount]) {
            let txhash = hash256(address.as_bytes());
            let outputs = values
                .iter()
                .enumerate()
                .map(|(n, v)| ReceivedOutput::new(txhash, n as u32, *v, script_pubkey.clone()))
                .collect();
            self.outputs.insert(address.to_string(), outputs);
        }
    }

    impl ChainIndex for MockChain {
        fn get_balance(&self, address: &str) -> Result<Amount> {
            if self.fail {
                return Err(WalletError::ChainIndex("index unavailable".to_string()));
            }
            Ok(self.outputs.get(address).map_or(0, |o| o.iter().map(|r| r.value).sum()))
        }

        fn received_outputs(&self, address: &str, _since_height: u32) -> Result<ReceivedBatch> {
            Ok(ReceivedBatch {
                outputs: self.outputs.get(address).cloned().unwrap_or_default(),
                height: self.height,
            })
        }
    }

    fn wallet() -> (tempfile::TempDir, Wallet) {
        let dir = tempfile::tempdir().unwrap();
        let wallet = Wallet::new(WalletConfig::new(dir.path())).unwrap();
        wallet.initialize().unwrap();
        (dir, wallet)
    }

    fn first_address(wallet: &Wallet) -> String {
        wallet.get_account(None).unwrap().keys().next().unwrap().clone()
    }

    fn funded_wallet(values: &[Amount]) -> (tempfile::TempDir, Wallet, MockChain) {
        let (dir, wallet) = wallet();
        let address = first_address(&wallet);
        let script = wallet.keys().address_to_script_pubkey(&address).unwrap();

        let mut chain = MockChain { height: 10, ..MockChain::default() };
        chain.fund(&address, script, values);
        wallet.get_balance(None, &chain).unwrap();
        (dir, wallet, chain)
    }

    #[test]
    fn test_balance_refresh_persists() {
        let (_dir, wallet, chain) = funded_wallet(&[4, 6]);

        let account = wallet.get_account(None).unwrap();
        let sub = account.values().next().unwrap();
        assert_eq!(sub.balance, 10);
        assert_eq!(sub.height, 10);
        assert_eq!(sub.received.len(), 2);

        // Refreshing again does not duplicate outputs
        assert_eq!(wallet.get_balance(None, &chain).unwrap(), 10);
        let account = wallet.get_account(None).unwrap();
        assert_eq!(account.values().next().unwrap().received.len(), 2);
    }

    #[test]
    fn test_balance_failure_propagates() {
        let (_dir, wallet) = wallet();
        let chain = MockChain { fail: true, ..MockChain::default() };

        assert!(matches!(
            wallet.get_balance(None, &chain),
            Err(WalletError::ChainIndex(_))
        ));
    }

    #[test]
    fn test_balance_unknown_account() {
        let (_dir, wallet) = wallet();
        let chain = MockChain::default();
        assert!(matches!(
            wallet.get_balance(Some("nope"), &chain),
            Err(WalletError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_send_marks_outputs_spent() {
        let (_dir, wallet, _chain) = funded_wallet(&[10]);
        let (_, to) = wallet.get_new_address(Some("savings")).unwrap();

        let tx = wallet.send_to_address(&to, 6, &FlatFee(1)).unwrap();
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[1].value, 3);

        let account = wallet.get_account(None).unwrap();
        let sub = account.values().next().unwrap();
        assert!(sub.received.iter().all(|r| r.spent));
        assert_eq!(sub.balance, 0);

        // The same output cannot fund a second payment
        assert!(matches!(
            wallet.send_to_address(&to, 6, &FlatFee(1)),
            Err(WalletError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_refresh_after_send_keeps_spent_outputs_out() {
        let (_dir, wallet, mut chain) = funded_wallet(&[10]);
        let (_, savings) = wallet.get_new_address(Some("savings")).unwrap();
        let (_, to) = wallet.get_new_address(Some("payee")).unwrap();

        wallet.send_to_address(&to, 6, &FlatFee(1)).unwrap();

        // The payment is not broadcast, so the chain still reports the output
        let script = wallet.keys().address_to_script_pubkey(&savings).unwrap();
        chain.fund(&savings, script, &[10]);
        assert_eq!(wallet.get_balance(None, &chain).unwrap(), 0);
        assert_eq!(wallet.get_balance(Some("savings"), &chain).unwrap(), 10);

        let sub = wallet.get_account(None).unwrap().into_values().next().unwrap();
        assert_eq!(sub.balance, 0);
        assert_eq!(sub.unspent().count(), 0);

        // The second payment is funded from the other account
        let tx = wallet.send_to_address(&to, 6, &FlatFee(1)).unwrap();
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.inputs[0].prev_tx_hash, hash256(savings.as_bytes()));

        let savings_account = wallet.get_account(Some("savings")).unwrap();
        assert!(savings_account[&savings].received.iter().all(|r| r.spent));
        assert_eq!(wallet.get_balance(Some("savings"), &chain).unwrap(), 0);
    }

    #[test]
    fn test_failed_send_persists_nothing() {
        let (_dir, wallet, _chain) = funded_wallet(&[10]);
        let before = wallet.get_accounts().unwrap();

        let result = wallet.send_to_address("not-an-address", 6, &FlatFee(1));
        assert!(matches!(result, Err(WalletError::Decode(_))));
        assert_eq!(wallet.get_accounts().unwrap(), before);
    }

    #[test]
    fn test_import_passphrase_key() {
        let (_dir, wallet) = wallet();
        let source = KeySource::Passphrase {
            passphrase: "brain wallet".to_string(),
            rounds: 1,
            compressed: true,
        };

        let (public_key, address) = wallet.import_key(Some("imported"), &source).unwrap();
        let account = wallet.get_account(Some("imported")).unwrap();
        assert_eq!(account[&address].public_key, public_key);

        let expected = wallet.keys().keypair_from_source(&source).unwrap();
        assert_eq!(public_key, hex::encode(expected.pubkey_bytes()));
    }

    #[test]
    fn test_import_encoded_private_key() {
        let (_dir, wallet) = wallet();
        let address = first_address(&wallet);
        let wif = wallet.get_account(None).unwrap()[&address].private_key.clone();

        // Importing into another account reproduces the same address
        let (_, imported) = wallet
            .import_key(Some("copy"), &KeySource::EncodedPrivateKey(wif))
            .unwrap();
        assert_eq!(imported, address);
    }

    #[test]
    fn test_mark_spent_unknown_output() {
        let (_dir, wallet) = wallet();
        let mut accounts = wallet.get_accounts().unwrap();
        let address = first_address(&wallet);
        let spent = vec![SpentOutput {
            account: "account".to_string(),
            address,
            txhash: Hash256::new([5; 32]),
            n: 0,
            value: 1,
        }];

        assert!(matches!(
            mark_spent(&mut accounts, &spent),
            Err(WalletError::MalformedUtxo { .. })
        ));
    }
}
