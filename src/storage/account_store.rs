// Persisted accounts: an index of names plus one record per account

use crate::error::{Result, WalletError};
use crate::storage::{OpenMode, WalletDb};
use crate::wallet::{Account, KeyManager, SubAccount};
use std::path::{Path, PathBuf};

/// Key of the ordered account-name list
pub const INDEX_KEY: &str = "accounts";

/// Named accounts in index order
pub type NamedAccounts = Vec<(String, Account)>;

/// Account store
///
/// Every operation opens its own database session and closes it before
/// returning, flushing only when the whole operation succeeded.
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the wallet with one fresh address in `default_account`.
    /// Returns false if the account index already exists.
    pub fn initialize(&self, keys: &KeyManager, default_account: &str) -> Result<bool> {
        validate_name(default_account)?;
        let mut db = WalletDb::open(&self.path, OpenMode::ReadWriteCreate)?;
        if db.contains(INDEX_KEY)? {
            log::debug!("Wallet at {} already initialized", self.path.display());
            return Ok(false);
        }

        let subaccount = keys.new_subaccount(&keys.generate_random());
        log::info!("Initializing wallet with address {}", subaccount.address);

        let mut account = Account::new();
        account.insert(subaccount.address.clone(), subaccount);
        write_account(&mut db, default_account, &account)?;
        write_index(&mut db, &[default_account.to_string()])?;
        db.flush()?;
        db.close();
        Ok(true)
    }

    /// Load one account by name
    pub fn get_account(&self, name: &str) -> Result<Account> {
        let db = WalletDb::open(&self.path, OpenMode::ReadOnly)?;
        let names = read_index(&db)?;
        if !names.iter().any(|n| n == name) {
            return Err(WalletError::AccountNotFound(name.to_string()));
        }
        read_account(&db, name)
    }

    /// Load every account in index order
    pub fn get_accounts(&self) -> Result<NamedAccounts> {
        let db = WalletDb::open(&self.path, OpenMode::ReadOnly)?;
        read_all(&db)
    }

    /// Generate a new address in `name`, creating the account if needed.
    /// Returns `(public_key, address)`.
    pub fn get_new_address(&self, keys: &KeyManager, name: &str) -> Result<(String, String)> {
        let subaccount = keys.new_subaccount(&keys.generate_random());
        self.add_subaccount(name, subaccount)
    }

    /// Insert a subaccount into `name`, creating the account if needed.
    /// An existing record for the same address is kept unchanged.
    pub fn add_subaccount(&self, name: &str, subaccount: SubAccount) -> Result<(String, String)> {
        validate_name(name)?;
        let mut db = WalletDb::open(&self.path, OpenMode::ReadWriteCreate)?;
        let mut names = read_index(&db)?;

        let mut account = if names.iter().any(|n| n == name) {
            read_account(&db, name)?
        } else {
            log::info!("Creating account {:?}", name);
            names.push(name.to_string());
            write_index(&mut db, &names)?;
            Account::new()
        };

        let result = (subaccount.public_key.clone(), subaccount.address.clone());
        log::info!("New address {} in account {:?}", subaccount.address, name);
        account.entry(subaccount.address.clone()).or_insert(subaccount);

        write_account(&mut db, name, &account)?;
        db.flush()?;
        db.close();
        Ok(result)
    }

    /// Load all accounts, let `f` modify them, then persist them in one
    /// flush. Nothing is written if `f` fails.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut NamedAccounts) -> Result<T>,
    {
        let mut db = WalletDb::open(&self.path, OpenMode::ReadWriteCreate)?;
        let mut accounts = read_all(&db)?;

        let out = f(&mut accounts)?;

        for (name, account) in &accounts {
            write_account(&mut db, name, account)?;
        }
        db.flush()?;
        db.close();
        Ok(out)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == INDEX_KEY {
        return Err(WalletError::InvalidAccountName(name.to_string()));
    }
    Ok(())
}

fn read_index(db: &WalletDb) -> Result<Vec<String>> {
    match db.get(INDEX_KEY)? {
        Some(data) => Ok(serde_json::from_slice(&data)?),
        None => Err(WalletError::NotInitialized),
    }
}

fn write_index(db: &mut WalletDb, names: &[String]) -> Result<()> {
    db.set(INDEX_KEY, serde_json::to_vec(names)?)
}

fn read_account(db: &WalletDb, name: &str) -> Result<Account> {
    match db.get(name)? {
        Some(data) => Ok(serde_json::from_slice(&data)?),
        None => Err(WalletError::StoreIo(format!(
            "account {:?} is indexed but has no record",
            name
        ))),
    }
}

fn write_account(db: &mut WalletDb, name: &str, account: &Account) -> Result<()> {
    db.set(name, serde_json::to_vec(account)?)
}

fn read_all(db: &WalletDb) -> Result<NamedAccounts> {
    read_index(db)?
        .into_iter()
        .map(|name| {
            let account = read_account(db, &name)?;
            Ok((name, account))
        })
        .collect()
}
