// CLI commands

use clap::{Parser, Subcommand, Args};
use std::path::PathBuf;
use crate::config::{WalletConfig, DEFAULT_DATA_DIR};
use crate::error::{Result, WalletError};
use crate::storage::NamedAccounts;
use crate::wallet::{account_balance, Account, FeePolicy, FlatFee, KeySource, SizeFee, SnapshotIndex, Wallet};

#[derive(Parser)]
#[command(name = "coin-wallet")]
#[command(about = "Minimal cryptocurrency wallet", long_about = None)]
pub struct Cli {
    /// Directory holding the wallet database
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Address version byte (0 mainnet, 111 testnet)
    #[arg(long, global = true, default_value_t = 0)]
    pub address_version: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the wallet with a first address
    Init,

    /// Create a new address
    NewAddress {
        /// Account to add the address to (created if missing)
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Import a key from a passphrase or an encoded private key
    Import(ImportArgs),

    /// Show the addresses of one account
    Account {
        #[arg(short, long)]
        account: Option<String>,
    },

    /// List all accounts
    Accounts,

    /// Refresh and print the balance of an account
    Balance {
        #[arg(short, long)]
        account: Option<String>,
        /// JSON chain snapshot to read balances and received outputs from
        #[arg(long)]
        chain_snapshot: PathBuf,
    },

    /// Build and sign a payment
    Send {
        /// Recipient address
        to: String,
        /// Amount in base units
        amount: u64,
        /// Flat transaction fee in base units
        #[arg(short, long, default_value = "1000")]
        fee: u64,
        /// Charge by estimated size instead (base units per 1000 bytes)
        #[arg(long)]
        fee_per_kb: Option<u64>,
    },
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(short, long)]
    pub account: Option<String>,

    /// Derive the secret from a passphrase (weak, unsalted)
    #[arg(long, conflicts_with = "wif", required_unless_present = "wif")]
    pub passphrase: Option<String>,

    /// SHA-256 rounds applied to the passphrase
    #[arg(long, default_value_t = 1)]
    pub rounds: u32,

    /// Use an uncompressed public key for passphrase keys
    #[arg(long)]
    pub uncompressed: bool,

    /// Encoded (WIF-style) private key
    #[arg(long)]
    pub wif: Option<String>,
}

impl ImportArgs {
    fn key_source(&self) -> Result<KeySource> {
        match (&self.passphrase, &self.wif) {
            (Some(passphrase), None) => Ok(KeySource::Passphrase {
                passphrase: passphrase.clone(),
                rounds: self.rounds,
                compressed: !self.uncompressed,
            }),
            (None, Some(wif)) => Ok(KeySource::EncodedPrivateKey(wif.clone())),
            _ => Err(WalletError::Config(
                "exactly one of --passphrase or --wif is required".to_string(),
            )),
        }
    }
}

/// CLI handler
pub struct CliHandler {
    wallet: Wallet,
}

impl CliHandler {
    /// Create a new CLI handler
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = WalletConfig {
            data_dir: cli.data_dir.clone(),
            address_version: cli.address_version,
            ..WalletConfig::default()
        };
        log::info!("Using wallet at {}", config.wallet_path().display());
        Ok(Self {
            wallet: Wallet::new(config)?,
        })
    }

    /// Handle CLI command
    pub fn handle(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Init => self.init(),
            Commands::NewAddress { account } => {
                let (public_key, address) = self.wallet.get_new_address(account.as_deref())?;
                println!("Address: {}", address);
                println!("Public key: {}", public_key);
                Ok(())
            }
            Commands::Import(args) => {
                let source = args.key_source()?;
                let (public_key, address) =
                    self.wallet.import_key(args.account.as_deref(), &source)?;
                println!("Imported address: {}", address);
                println!("Public key: {}", public_key);
                Ok(())
            }
            Commands::Account { account } => {
                let name = account.as_deref().unwrap_or(&self.wallet.config().default_account);
                let record = self.wallet.get_account(Some(name))?;
                self.print_account(name, &record);
                Ok(())
            }
            Commands::Accounts => {
                let accounts = self.wallet.get_accounts()?;
                self.print_accounts(&accounts);
                Ok(())
            }
            Commands::Balance { account, chain_snapshot } => {
                let chain = SnapshotIndex::load(&chain_snapshot)?;
                let balance = self.wallet.get_balance(account.as_deref(), &chain)?;
                println!("Balance at height {}:", chain.height());
                println!("  {} units ({} coins)", balance, balance as f64 / 100_000_000.0);
                Ok(())
            }
            Commands::Send { to, amount, fee, fee_per_kb } => {
                let policy: Box<dyn FeePolicy> = match fee_per_kb {
                    Some(per_kb) => Box::new(SizeFee { per_kb, minimum: fee }),
                    None => Box::new(FlatFee(fee)),
                };
                let tx = self.wallet.send_to_address(&to, amount, policy.as_ref())?;

                println!("Transaction created:");
                println!("  TXID: {}", tx.txid());
                println!("  Inputs: {}", tx.inputs.len());
                println!("  Outputs: {}", tx.outputs.len());
                println!("  Total output: {} units", tx.total_output_value());
                println!("  Raw: {}", hex::encode(tx.serialize()));
                Ok(())
            }
        }
    }

    /// Initialize wallet
    fn init(&self) -> Result<()> {
        if self.wallet.initialize()? {
            let account = self.wallet.get_account(None)?;
            println!("✓ Wallet created");
            self.print_account(&self.wallet.config().default_account, &account);
        } else {
            println!("Wallet already initialized");
        }
        Ok(())
    }

    fn print_account(&self, name: &str, account: &Account) {
        println!("Account {} ({} addresses, balance {}):", name, account.len(), account_balance(account));
        for sub in account.values() {
            let unspent = sub.unspent().count();
            println!("  {}  balance {}  height {}  unspent outputs {}", sub.address, sub.balance, sub.height, unspent);
        }
    }

    fn print_accounts(&self, accounts: &NamedAccounts) {
        println!("Accounts ({}):", accounts.len());
        for (name, account) in accounts {
            println!("  {}  {} addresses  balance {}", name, account.len(), account_balance(account));
        }
    }
}
