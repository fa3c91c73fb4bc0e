//! Stake and payment address construction from an account key.

use crate::bip32::{ExtendedPrivateKey, ExtendedPublicKey, KeyDeriver};
use crate::error::CryptoError;
use crate::provider::{self, Provider};
use stakeleaf_types::{Address, Chain, NetworkId, PaymentCredential, StakeCredential};

/// Staking key of an account (`account / 2 / 0`) and its credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeKey {
    pub public_key: ExtendedPublicKey,
    pub credential: StakeCredential,
}

/// Builds reward and base addresses over an injected primitives provider.
#[derive(Clone)]
pub struct AddressBuilder {
    deriver: KeyDeriver,
    provider: Provider,
}

impl AddressBuilder {
    pub fn new(provider: Provider) -> Self {
        Self {
            deriver: KeyDeriver::new(provider.clone()),
            provider,
        }
    }

    pub fn global() -> Self {
        Self::new(provider::global())
    }

    pub fn deriver(&self) -> &KeyDeriver {
        &self.deriver
    }

    fn public_key_of(&self, key: &ExtendedPrivateKey) -> ExtendedPublicKey {
        self.deriver.public_key(key)
    }

    /// Stake public key and credential of `account_key`.
    pub fn stake_credential(
        &self,
        account_key: &ExtendedPrivateKey,
    ) -> Result<StakeKey, CryptoError> {
        let stake_key = self
            .deriver
            .derive_chain_index_key(account_key, Chain::Staking, 0)?;
        let public_key = self.public_key_of(&stake_key);
        let credential =
            StakeCredential::from_key_hash(self.provider.key_hash(public_key.public_key()));

        Ok(StakeKey {
            public_key,
            credential,
        })
    }

    /// Reward address for `stake` on `network`.
    pub fn stake_address(&self, network: NetworkId, stake: &StakeCredential) -> Address {
        Address::reward(network, *stake)
    }

    /// Reward address of `account_key` on `network`.
    pub fn stake_address_for(
        &self,
        account_key: &ExtendedPrivateKey,
        network: NetworkId,
    ) -> Result<Address, CryptoError> {
        let stake = self.stake_credential(account_key)?;
        Ok(self.stake_address(network, &stake.credential))
    }

    /// Payment credential at `chain / index`. Only the external and internal chains qualify.
    pub fn payment_credential(
        &self,
        account_key: &ExtendedPrivateKey,
        chain: Chain,
        index: u32,
    ) -> Result<PaymentCredential, CryptoError> {
        let key = self.payment_key(account_key, chain, index)?;
        Ok(self.credential_for(&key))
    }

    fn payment_key(
        &self,
        account_key: &ExtendedPrivateKey,
        chain: Chain,
        index: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        if !chain.is_payment() {
            return Err(CryptoError::InvalidChain(chain.as_u32()));
        }
        self.deriver.derive_chain_index_key(account_key, chain, index)
    }

    fn credential_for(&self, key: &ExtendedPrivateKey) -> PaymentCredential {
        let public_key = self.provider.public_key(key);
        PaymentCredential::from_key_hash(self.provider.key_hash(&public_key))
    }

    /// Base address combining a payment credential with the account's stake credential.
    pub fn payment_address(
        &self,
        network: NetworkId,
        payment: &PaymentCredential,
        stake: &StakeCredential,
    ) -> Address {
        Address::base(network, *payment, *stake)
    }

    /// Base address at `chain / index`.
    pub fn payment_address_at(
        &self,
        account_key: &ExtendedPrivateKey,
        network: NetworkId,
        chain: Chain,
        index: u32,
    ) -> Result<Address, CryptoError> {
        let stake = self.stake_credential(account_key)?;
        let payment = self.payment_credential(account_key, chain, index)?;
        Ok(self.payment_address(network, &payment, &stake.credential))
    }

    /// Base addresses at indices `0..count` on `chain`, in index order.
    pub fn derive_multiple_addresses(
        &self,
        account_key: &ExtendedPrivateKey,
        network: NetworkId,
        chain: Chain,
        count: u32,
    ) -> Result<Vec<Address>, CryptoError> {
        if !chain.is_payment() {
            return Err(CryptoError::InvalidChain(chain.as_u32()));
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let stake = self.stake_credential(account_key)?;
        let keys = self.deriver.derive_range(account_key, chain, 0, count)?;

        tracing::debug!(%network, %chain, count, "Derived payment addresses");

        Ok(keys
            .iter()
            .map(|key| self.payment_address(network, &self.credential_for(key), &stake.credential))
            .collect())
    }

    /// Bech32 text of `address`.
    pub fn encode(&self, address: &Address) -> Result<String, CryptoError> {
        self.provider.bech32_encode(address.hrp(), &address.to_bytes())
    }

    /// Parse bech32 address text. Any checksum, prefix, header or length
    /// problem is `InvalidAddressEncoding`.
    pub fn decode(&self, text: &str) -> Result<Address, CryptoError> {
        let (hrp, payload) = self.provider.bech32_decode(text.trim())?;
        let address = Address::from_bytes(&payload)
            .map_err(|e| CryptoError::InvalidAddressEncoding(e.to_string()))?;

        if hrp != address.hrp() {
            return Err(CryptoError::InvalidAddressEncoding(format!(
                "prefix '{}' does not match header (expected '{}')",
                hrp,
                address.hrp()
            )));
        }
        Ok(address)
    }
}

impl Default for AddressBuilder {
    fn default() -> Self {
        Self::global()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT_HEX: &str = "506fff12bc650fb9e5e7de69010ddf22913d4bb006eccc0e6d07b4a068e1a45ea12aa86a63aa5bf7ffd5da2634f5bd3c56c1e83d2d7503a6d4a902b277d2cd7e8fa5fcd46abd9d46d4d8a97a8f3465e2c4e8f3c9dad9ff66823a161ecadca604";

    fn account() -> ExtendedPrivateKey {
        ExtendedPrivateKey::from_slice(&hex::decode(ACCOUNT_HEX).unwrap()).unwrap()
    }

    #[test]
    fn test_stake_address_vectors() {
        let builder = AddressBuilder::global();
        let stake = builder.stake_credential(&account()).unwrap();
        assert_eq!(
            hex::encode(stake.public_key.public_key()),
            "2c041c9c6a676ac54d25e2fdce44c56581e316ae43adc4c7bf17f23214d8d892"
        );

        let testnet = builder.stake_address(NetworkId::TESTNET, &stake.credential);
        assert_eq!(
            builder.encode(&testnet).unwrap(),
            "stake_test1uqevw2xnsc0pvn9t9r9c7qryfqfeerchgrlm3ea2nefr9hqp8n5xl"
        );
        let mainnet = builder.stake_address_for(&account(), NetworkId::MAINNET).unwrap();
        assert_eq!(
            mainnet.to_string(),
            "stake1uyevw2xnsc0pvn9t9r9c7qryfqfeerchgrlm3ea2nefr9hqxdekzz"
        );
    }

    #[test]
    fn test_payment_address_vectors() {
        let builder = AddressBuilder::global();
        let addr = builder
            .payment_address_at(&account(), NetworkId::TESTNET, Chain::External, 0)
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwq2ytjqp"
        );

        let change = builder
            .payment_address_at(&account(), NetworkId::MAINNET, Chain::Internal, 0)
            .unwrap();
        assert_eq!(
            change.to_string(),
            "addr1qx4kjk0as0x7ptt54l6cnfyzejqg22cku0qhqx6al4g2xepjcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwqhpmech"
        );
    }

    #[test]
    fn test_staking_chain_is_not_a_payment_chain() {
        let builder = AddressBuilder::global();
        assert_eq!(
            builder
                .payment_address_at(&account(), NetworkId::TESTNET, Chain::Staking, 0)
                .unwrap_err(),
            CryptoError::InvalidChain(2)
        );
        assert_eq!(
            builder
                .derive_multiple_addresses(&account(), NetworkId::TESTNET, Chain::Staking, 3)
                .unwrap_err(),
            CryptoError::InvalidChain(2)
        );
    }

    #[test]
    fn test_derive_multiple_addresses() {
        let builder = AddressBuilder::global();
        let addrs = builder
            .derive_multiple_addresses(&account(), NetworkId::TESTNET, Chain::External, 2)
            .unwrap();
        assert_eq!(
            addrs.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
            vec![
                "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwq2ytjqp",
                "addr_test1qz7svwszky8gcmhrfza7a89z9u0dfzd3l7h23sqlc5yml7ejcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwqcqrvr0",
            ]
        );

        assert!(builder
            .derive_multiple_addresses(&account(), NetworkId::TESTNET, Chain::Internal, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_decode() {
        let builder = AddressBuilder::global();
        let text = "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwqfjkjv7";
        let addr = builder.decode(text).unwrap();
        assert_eq!(addr.network_id(), NetworkId::MAINNET);
        assert_eq!(
            addr.payment_credential().unwrap().key_hash().to_hex(),
            "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e"
        );
        assert_eq!(builder.encode(&addr).unwrap(), text);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let builder = AddressBuilder::global();
        // Last checksum character altered
        let corrupted = "stake1uyevw2xnsc0pvn9t9r9c7qryfqfeerchgrlm3ea2nefr9hqxdekzq";
        assert!(matches!(
            builder.decode(corrupted),
            Err(CryptoError::InvalidAddressEncoding(_))
        ));
        assert!(matches!(
            builder.decode("garbage"),
            Err(CryptoError::InvalidAddressEncoding(_))
        ));
        // Mainnet payload under the testnet prefix
        let payload = builder.decode("stake1uyevw2xnsc0pvn9t9r9c7qryfqfeerchgrlm3ea2nefr9hqxdekzz")
            .unwrap()
            .to_bytes();
        let relabeled = stakeleaf_types::codec::encode("stake_test", &payload).unwrap();
        assert!(matches!(
            builder.decode(&relabeled),
            Err(CryptoError::InvalidAddressEncoding(_))
        ));
    }
}
