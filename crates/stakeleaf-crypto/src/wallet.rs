//! One-shot wallet derivation: phrase in, addresses and encrypted root key out.

use crate::address::AddressBuilder;
use crate::bip32::{ExtendedPrivateKey, ExtendedPublicKey};
use crate::error::CryptoError;
use crate::keystore::{EncryptedKeyEnvelope, KdfParams, KeyVault};
use crate::mnemonic::Mnemonics;
use crate::provider::{self, Provider};
use stakeleaf_types::{Address, Chain, NetworkId};

/// Addresses of one account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountAddresses {
    pub network: NetworkId,
    pub account: u32,
    pub account_public_key: ExtendedPublicKey,
    pub stake_address: Address,
    /// Receiving addresses, index order
    pub external: Vec<Address>,
    /// Change addresses, index order
    pub internal: Vec<Address>,
}

/// Result of [`WalletDeriver::derive_wallet`].
#[derive(Clone, Debug)]
pub struct DerivedWallet {
    pub addresses: AccountAddresses,
    /// Root key under the caller's password
    pub encrypted_key: EncryptedKeyEnvelope,
}

/// Runs the whole derivation in one synchronous call.
#[derive(Clone)]
pub struct WalletDeriver {
    mnemonics: Mnemonics,
    addresses: AddressBuilder,
    vault: KeyVault,
}

impl WalletDeriver {
    pub fn new(provider: Provider, params: KdfParams) -> Self {
        Self {
            mnemonics: Mnemonics::new(provider.clone()),
            addresses: AddressBuilder::new(provider.clone()),
            vault: KeyVault::new(provider, params),
        }
    }

    pub fn with_params(params: KdfParams) -> Self {
        Self::new(provider::global(), params)
    }

    pub fn global() -> Self {
        Self::with_params(KdfParams::default())
    }

    /// Root key for `phrase`. The phrase is validated before anything is derived.
    pub fn root_key(
        &self,
        phrase: &str,
        passphrase: &str,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        let entropy = self.mnemonics.to_entropy(phrase)?;
        self.addresses
            .deriver()
            .root_key_from_entropy(entropy.as_bytes(), passphrase)
    }

    /// Stake address plus `count` external and `count` internal addresses of `account`.
    pub fn account_addresses(
        &self,
        root: &ExtendedPrivateKey,
        account: u32,
        network: NetworkId,
        count: u32,
    ) -> Result<AccountAddresses, CryptoError> {
        let account_key = self.addresses.deriver().derive_account_key(root, account)?;

        Ok(AccountAddresses {
            network,
            account,
            account_public_key: self.addresses.deriver().public_key(&account_key),
            stake_address: self.addresses.stake_address_for(&account_key, network)?,
            external: self.addresses.derive_multiple_addresses(
                &account_key,
                network,
                Chain::External,
                count,
            )?,
            internal: self.addresses.derive_multiple_addresses(
                &account_key,
                network,
                Chain::Internal,
                count,
            )?,
        })
    }

    /// Derive addresses for `account` and encrypt the root key under `password`.
    pub fn derive_wallet(
        &self,
        phrase: &str,
        account: u32,
        password: &str,
        network: NetworkId,
        count: u32,
    ) -> Result<DerivedWallet, CryptoError> {
        let root = self.root_key(phrase, "")?;
        let addresses = self.account_addresses(&root, account, network, count)?;
        let encrypted_key = self.vault.encrypt(&root, password)?;

        tracing::info!(
            account,
            %network,
            count,
            envelope = %encrypted_key.id,
            "Derived wallet"
        );

        Ok(DerivedWallet {
            addresses,
            encrypted_key,
        })
    }

    /// Decrypt a stored root key and re-derive the account's addresses.
    pub fn open_wallet(
        &self,
        envelope: &EncryptedKeyEnvelope,
        password: &str,
        account: u32,
        network: NetworkId,
        count: u32,
    ) -> Result<AccountAddresses, CryptoError> {
        let root = self.vault.decrypt(password, envelope)?;
        self.account_addresses(&root, account, network, count)
    }
}

impl Default for WalletDeriver {
    fn default() -> Self {
        Self::global()
    }
}

/// [`WalletDeriver::derive_wallet`] on the global provider with default KDF cost.
pub fn derive_wallet(
    phrase: &str,
    account: u32,
    password: &str,
    network: NetworkId,
    count: u32,
) -> Result<DerivedWallet, CryptoError> {
    WalletDeriver::global().derive_wallet(phrase, account, password, network, count)
}
