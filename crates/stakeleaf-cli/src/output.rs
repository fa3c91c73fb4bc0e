//! Output formatting utilities.

use colored::Colorize;
use stakeleaf_crypto::{AccountAddresses, ExtendedPublicKey, MnemonicPhrase};
use stakeleaf_types::{Address, Chain, DerivationPath};

/// Print success message.
pub fn print_success(msg: &str) {
    println!("{}", format!("✓ {}", msg).green());
}

/// Print error message.
pub fn print_error(msg: &str) {
    eprintln!("{}", format!("✗ {}", msg).red());
}

/// Print warning message.
pub fn print_warning(msg: &str) {
    println!("{}", format!("⚠ {}", msg).yellow());
}

/// Print info message.
pub fn print_info(msg: &str) {
    println!("{}", format!("ℹ {}", msg).blue());
}

/// Numbered word grid, four words per row.
pub fn format_phrase(phrase: &MnemonicPhrase) -> String {
    let words: Vec<String> = phrase
        .words()
        .enumerate()
        .map(|(i, w)| format!("{:>2}. {:<10}", i + 1, w))
        .collect();

    words
        .chunks(4)
        .map(|row| row.join(" ").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a recovery phrase with its storage warning.
pub fn print_phrase(phrase: &MnemonicPhrase) {
    println!("{}", "Recovery phrase".bold());
    println!("{}", "=".repeat(50));
    println!("{}", format_phrase(phrase).bright_white());
    println!();
    print_warning(
        "Write these words down and keep them offline. They restore every key of the wallet.",
    );
}

/// Account key as `acct_xvk` bech32, or hex if encoding fails.
pub fn format_account_key(key: &ExtendedPublicKey) -> String {
    key.to_bech32().unwrap_or_else(|_| key.to_hex())
}

/// One address line: derivation path then bech32 text.
pub fn format_address_line(path: &DerivationPath, address: &Address) -> String {
    format!("{:<24} {}", path.to_string(), address)
}

/// Print stake address and both address chains of an account.
pub fn print_account_addresses(addresses: &AccountAddresses) {
    let account = addresses.account;

    println!("{}", "Account".bold());
    println!("{}", "=".repeat(50));
    println!("Network:       {}", addresses.network.to_string().bright_green());
    println!("Account:       {}", account.to_string().bright_green());
    println!(
        "Account xpub:  {}",
        format_account_key(&addresses.account_public_key).bright_cyan()
    );
    println!(
        "Stake address: {}",
        addresses.stake_address.to_string().bright_cyan()
    );

    for (title, chain, list) in [
        ("External addresses", Chain::External, &addresses.external),
        ("Internal addresses", Chain::Internal, &addresses.internal),
    ] {
        println!();
        println!("{}", title.bold());
        for (index, address) in list.iter().enumerate() {
            match DerivationPath::cip1852(account, chain, index as u32) {
                Ok(path) => println!("  {}", format_address_line(&path, address)),
                Err(_) => println!("  {}", address),
            }
        }
    }
}
