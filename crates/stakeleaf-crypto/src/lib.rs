//! Stakeleaf Crypto - Key derivation and address construction for CIP-1852 wallets.
//!
//! This crate provides:
//! - BIP-39 recovery phrases and entropy
//! - Ed25519-BIP32 key derivation (Icarus root, `1852'/1815'/account'/chain/index`)
//! - Reward and base address construction
//! - Password-protected key envelopes (Argon2id + AES-256-GCM)
//! - A single-call wallet derivation pipeline
//!
//! Every component takes its primitives from an injected [`CryptoProvider`];
//! the `global()` constructors use the process-wide default.

pub mod address;
pub mod bip32;
pub mod error;
pub mod hash;
pub mod keystore;
pub mod mnemonic;
pub mod provider;
pub mod wallet;

pub use address::{AddressBuilder, StakeKey};
pub use bip32::{ExtendedPrivateKey, ExtendedPublicKey, KeyDeriver};
pub use error::CryptoError;
pub use keystore::{EncryptedKeyEnvelope, KdfParams, KeyVault};
pub use mnemonic::{Entropy, MnemonicPhrase, Mnemonics};
pub use provider::{CryptoProvider, Primitives, Provider};
pub use wallet::{derive_wallet, AccountAddresses, DerivedWallet, WalletDeriver};
