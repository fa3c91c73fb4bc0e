//! CLI command implementations.

use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;
use stakeleaf_crypto::mnemonic::{self, DEFAULT_STRENGTH};
use stakeleaf_crypto::{AccountAddresses, CryptoError, Mnemonics, MnemonicPhrase, WalletDeriver};
use stakeleaf_types::NetworkId;
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::keystore::Keystore;
use crate::output::*;

const PASSWORD_ENV: &str = "STAKELEAF_PASSWORD";

/// Main CLI.
#[derive(Parser, Debug)]
#[command(name = "stakeleaf")]
#[command(about = "Stakeleaf - CIP-1852 wallet keys and addresses")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Config file (default: ~/.stakeleaf/config.toml)
    #[arg(long, global = true, env = "STAKELEAF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Network: mainnet, testnet or a numeric id
    #[arg(short, long, global = true, env = "STAKELEAF_NETWORK")]
    pub network: Option<NetworkId>,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recovery phrases
    #[command(subcommand)]
    Mnemonic(MnemonicCommands),

    /// Print the stake address and address lists of an account
    Address {
        /// Account index
        #[arg(short, long)]
        account: Option<u32>,
        /// Addresses per chain
        #[arg(short, long)]
        count: Option<u32>,
        /// Recovery phrase (prompted when absent)
        #[arg(env = "STAKELEAF_MNEMONIC", hide_env_values = true)]
        phrase: Option<String>,
    },

    /// Encrypted wallets in the keystore
    #[command(subcommand)]
    Wallet(WalletCommands),
}

/// Mnemonic commands.
#[derive(Subcommand, Debug)]
pub enum MnemonicCommands {
    /// Generate a fresh recovery phrase
    New {
        /// Number of words (12, 15, 18, 21, 24)
        #[arg(short, long)]
        words: Option<usize>,
    },
    /// Check a recovery phrase
    Check {
        /// Phrase words
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
    },
}

/// Wallet commands.
#[derive(Subcommand, Debug)]
pub enum WalletCommands {
    /// Create a wallet and store its encrypted root key
    Create {
        /// Wallet name
        #[arg(long)]
        name: String,
        /// Number of words for the new phrase
        #[arg(short, long)]
        words: Option<usize>,
        /// Restore from an existing phrase instead of generating one
        #[arg(long)]
        restore: bool,
        /// Account index
        #[arg(short, long)]
        account: Option<u32>,
        /// Addresses per chain
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// Decrypt a stored wallet and print its addresses
    Show {
        /// Wallet name
        #[arg(long)]
        name: String,
        /// Account index
        #[arg(short, long)]
        account: Option<u32>,
        /// Addresses per chain
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// List stored wallets
    List,
}

/// Config file values with command-line overrides applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: CliConfig,
    pub network: NetworkId,
}

impl Settings {
    pub fn new(config: CliConfig, network: Option<NetworkId>) -> Self {
        let network = network.unwrap_or(config.network);
        Self { config, network }
    }

    fn account(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.config.account)
    }

    fn count(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.config.address_count)
    }

    fn deriver(&self) -> WalletDeriver {
        WalletDeriver::with_params(self.config.kdf)
    }
}

/// Execute a command.
pub fn execute(cmd: Commands, settings: &Settings) -> anyhow::Result<()> {
    match cmd {
        Commands::Mnemonic(cmd) => execute_mnemonic(cmd),
        Commands::Address {
            account,
            count,
            phrase,
        } => {
            let phrase = read_phrase(phrase)?;
            let addresses = derive_addresses(
                &settings.deriver(),
                &phrase,
                settings.account(account),
                settings.network,
                settings.count(count),
            )?;
            print_account_addresses(&addresses);
            Ok(())
        }
        Commands::Wallet(cmd) => execute_wallet(cmd, settings),
    }
}

/// Execute mnemonic commands.
fn execute_mnemonic(cmd: MnemonicCommands) -> anyhow::Result<()> {
    match cmd {
        MnemonicCommands::New { words } => {
            let phrase = new_phrase(words)?;
            print_phrase(&phrase);
        }

        MnemonicCommands::Check { phrase } => {
            let phrase = phrase.join(" ");
            check_phrase(&phrase)?;
            print_success("Recovery phrase is valid");
        }
    }
    Ok(())
}

/// Execute wallet commands.
fn execute_wallet(cmd: WalletCommands, settings: &Settings) -> anyhow::Result<()> {
    let keystore = Keystore::new(settings.config.keystore_path())?;

    match cmd {
        WalletCommands::Create {
            name,
            words,
            restore,
            account,
            count,
        } => {
            if keystore.wallet_path(&name)?.exists() {
                anyhow::bail!("Wallet '{}' already exists", name);
            }

            let phrase = if restore {
                read_phrase(None)?
            } else {
                let phrase = new_phrase(words)?;
                print_phrase(&phrase);
                println!();
                phrase.as_str().to_string()
            };

            let password = read_password(true)?;
            let addresses = create_wallet(
                &keystore,
                &settings.deriver(),
                &name,
                &phrase,
                &password,
                settings.account(account),
                settings.network,
                settings.count(count),
            )?;

            print_success(&format!("Created wallet '{}'", name));
            print_info("The root key is encrypted with Argon2id + AES-256-GCM in the keystore.");
            println!();
            print_account_addresses(&addresses);
        }

        WalletCommands::Show {
            name,
            account,
            count,
        } => {
            if !keystore.has_wallet(&name) {
                anyhow::bail!("Wallet not found: {}", name);
            }

            let password = read_password(false)?;
            let addresses = show_wallet(
                &keystore,
                &settings.deriver(),
                &name,
                &password,
                settings.account(account),
                settings.network,
                settings.count(count),
            )?;

            println!("Wallet: {}", name.bright_green());
            print_account_addresses(&addresses);
        }

        WalletCommands::List => {
            let wallets = keystore.list_wallets()?;

            if wallets.is_empty() {
                println!("{}", "No wallets found".yellow());
                println!("Create a wallet with: stakeleaf wallet create --name <NAME>");
            } else {
                println!("{}", "Wallets:".bold());
                for wallet in &wallets {
                    println!(
                        "  • {} - {}",
                        wallet.name.bright_green(),
                        wallet.path.display().to_string().bright_cyan()
                    );
                }
                println!("\nTotal: {} wallet(s)", wallets.len());
            }
        }
    }
    Ok(())
}

/// Fresh phrase with `words` words, or the default strength.
pub fn new_phrase(words: Option<usize>) -> anyhow::Result<MnemonicPhrase> {
    let strength = match words {
        Some(n) => mnemonic::strength_for_words(n).ok_or_else(|| {
            anyhow::anyhow!("Unsupported word count: {} (use 12, 15, 18, 21 or 24)", n)
        })?,
        None => DEFAULT_STRENGTH,
    };
    Ok(Mnemonics::global().generate(strength)?)
}

/// Validate a phrase, naming the likely problem when it is rejected.
pub fn check_phrase(phrase: &str) -> anyhow::Result<()> {
    if Mnemonics::global().validate(phrase) {
        return Ok(());
    }

    let words = phrase.split_whitespace().count();
    if mnemonic::strength_for_words(words).is_none() {
        anyhow::bail!(
            "Invalid recovery phrase: {} words (expected 12, 15, 18, 21 or 24)",
            words
        );
    }
    anyhow::bail!("Invalid recovery phrase: unknown word or checksum mismatch")
}

/// Addresses of `account` for `phrase`.
pub fn derive_addresses(
    deriver: &WalletDeriver,
    phrase: &str,
    account: u32,
    network: NetworkId,
    count: u32,
) -> anyhow::Result<AccountAddresses> {
    let root = deriver.root_key(phrase, "")?;
    Ok(deriver.account_addresses(&root, account, network, count)?)
}

/// Run the wallet pipeline and store the envelope as `<name>.json`.
#[allow(clippy::too_many_arguments)]
pub fn create_wallet(
    keystore: &Keystore,
    deriver: &WalletDeriver,
    name: &str,
    phrase: &str,
    password: &str,
    account: u32,
    network: NetworkId,
    count: u32,
) -> anyhow::Result<AccountAddresses> {
    // Reject bad names before the expensive KDF runs
    keystore.wallet_path(name)?;

    let wallet = deriver.derive_wallet(phrase, account, password, network, count)?;
    let path = keystore.save_wallet(name, &wallet.encrypted_key)?;
    tracing::info!(wallet = name, path = %path.display(), "Wallet created");

    Ok(wallet.addresses)
}

/// Decrypt wallet `name` and re-derive the account's addresses.
pub fn show_wallet(
    keystore: &Keystore,
    deriver: &WalletDeriver,
    name: &str,
    password: &str,
    account: u32,
    network: NetworkId,
    count: u32,
) -> anyhow::Result<AccountAddresses> {
    let envelope = keystore.load_wallet(name)?;

    match deriver.open_wallet(&envelope, password, account, network, count) {
        Ok(addresses) => Ok(addresses),
        Err(CryptoError::WrongPasswordOrCorruptData) => {
            anyhow::bail!("Failed to open wallet. Wrong password?")
        }
        Err(e) => Err(e.into()),
    }
}

/// Phrase from the argument (or STAKELEAF_MNEMONIC), else a hidden prompt.
fn read_phrase(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(phrase) => Ok(phrase),
        None => Ok(Password::new()
            .with_prompt("Recovery phrase")
            .interact()?),
    }
}

/// Password from STAKELEAF_PASSWORD, else a hidden prompt.
fn read_password(confirm: bool) -> anyhow::Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    let prompt = Password::new();
    let password = if confirm {
        prompt
            .with_prompt("Set password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?
    } else {
        prompt.with_prompt("Enter wallet password").interact()?
    };
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakeleaf_crypto::KdfParams;
    use tempfile::TempDir;

    const PHRASE: &str = "test walk nut penalty hip pave soap entry language right filter choice";
    const STAKE_TESTNET: &str = "stake_test1uqevw2xnsc0pvn9t9r9c7qryfqfeerchgrlm3ea2nefr9hqp8n5xl";
    const BASE_TESTNET: &str =
        "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwq2ytjqp";

    fn deriver() -> WalletDeriver {
        WalletDeriver::with_params(KdfParams::insecure_fast())
    }

    #[test]
    fn test_parse_address_command() {
        let cli = Cli::try_parse_from([
            "stakeleaf", "--network", "testnet", "address", "--account", "2", "-c", "3", PHRASE,
        ])
        .unwrap();

        assert_eq!(cli.network, Some(NetworkId::TESTNET));
        match cli.command {
            Commands::Address {
                account,
                count,
                phrase,
            } => {
                assert_eq!(account, Some(2));
                assert_eq!(count, Some(3));
                assert_eq!(phrase.as_deref(), Some(PHRASE));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_mnemonic_check_joins_words() {
        let mut args = vec!["stakeleaf", "mnemonic", "check"];
        args.extend(PHRASE.split(' '));
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Mnemonic(MnemonicCommands::Check { phrase }) => {
                assert_eq!(phrase.join(" "), PHRASE);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_network() {
        assert!(Cli::try_parse_from(["stakeleaf", "--network", "16", "wallet", "list"]).is_err());
        assert!(Cli::try_parse_from(["stakeleaf", "wallet", "create"]).is_err());
    }

    #[test]
    fn test_settings_overrides() {
        let config = CliConfig {
            account: 4,
            address_count: 7,
            ..CliConfig::default()
        };

        let settings = Settings::new(config.clone(), None);
        assert_eq!(settings.network, NetworkId::MAINNET);
        assert_eq!(settings.account(None), 4);
        assert_eq!(settings.count(Some(2)), 2);

        let settings = Settings::new(config, Some(NetworkId::TESTNET));
        assert_eq!(settings.network, NetworkId::TESTNET);
    }

    #[test]
    fn test_new_phrase_word_counts() {
        assert_eq!(new_phrase(None).unwrap().word_count(), 15);
        assert_eq!(new_phrase(Some(24)).unwrap().word_count(), 24);
        assert!(new_phrase(Some(13)).is_err());
    }

    #[test]
    fn test_check_phrase() {
        assert!(check_phrase(PHRASE).is_ok());
        assert!(check_phrase(&format!("  {}  ", PHRASE.to_uppercase())).is_ok());

        let short = check_phrase("test walk nut").unwrap_err().to_string();
        assert!(short.contains("3 words"));

        let bad = PHRASE.replace("choice", "filter");
        let checksum = check_phrase(&bad).unwrap_err().to_string();
        assert!(checksum.contains("checksum"));
    }

    #[test]
    fn test_derive_addresses() {
        let addresses = derive_addresses(&deriver(), PHRASE, 0, NetworkId::TESTNET, 2).unwrap();

        assert_eq!(addresses.stake_address.to_string(), STAKE_TESTNET);
        assert_eq!(addresses.external[0].to_string(), BASE_TESTNET);
        assert_eq!(addresses.external.len(), 2);
        assert_eq!(addresses.internal.len(), 2);
    }

    #[test]
    fn test_create_then_show_wallet() {
        let dir = TempDir::new().unwrap();
        let keystore = Keystore::new(dir.path()).unwrap();
        let deriver = deriver();

        let created =
            create_wallet(&keystore, &deriver, "main", PHRASE, "hunter2", 0, NetworkId::TESTNET, 3)
                .unwrap();
        assert!(dir.path().join("main.json").exists());
        assert_eq!(created.stake_address.to_string(), STAKE_TESTNET);

        let shown =
            show_wallet(&keystore, &deriver, "main", "hunter2", 0, NetworkId::TESTNET, 3).unwrap();
        assert_eq!(shown, created);

        // Other accounts and networks come from the same stored root key
        let mainnet =
            show_wallet(&keystore, &deriver, "main", "hunter2", 1, NetworkId::MAINNET, 1).unwrap();
        assert_eq!(mainnet.account, 1);
        assert!(mainnet.stake_address.to_string().starts_with("stake1"));
    }

    #[test]
    fn test_show_wallet_wrong_password() {
        let dir = TempDir::new().unwrap();
        let keystore = Keystore::new(dir.path()).unwrap();
        let deriver = deriver();

        let net = NetworkId::TESTNET;
        create_wallet(&keystore, &deriver, "main", PHRASE, "right", 0, net, 1).unwrap();

        let err = show_wallet(&keystore, &deriver, "main", "wrong", 0, net, 1)
            .unwrap_err()
            .to_string();
        assert_eq!(err, "Failed to open wallet. Wrong password?");
    }

    #[test]
    fn test_create_wallet_rejects_invalid_input() {
        let dir = TempDir::new().unwrap();
        let keystore = Keystore::new(dir.path()).unwrap();
        let deriver = deriver();

        let bad = PHRASE.replace("choice", "filter");
        let net = NetworkId::TESTNET;
        assert!(create_wallet(&keystore, &deriver, "main", &bad, "pw", 0, net, 1).is_err());
        assert!(create_wallet(&keystore, &deriver, "../up", PHRASE, "pw", 0, net, 1).is_err());
        assert!(keystore.list_wallets().unwrap().is_empty());

        create_wallet(&keystore, &deriver, "main", PHRASE, "pw", 0, net, 1).unwrap();
        assert!(create_wallet(&keystore, &deriver, "main", PHRASE, "pw", 0, net, 1).is_err());
    }
}
