//! Cryptographic primitives provider.
//!
//! The wallet components never call primitive crates directly for mnemonic
//! checksums, seed expansion, child derivation, public keys, key hashes, bech32
//! or randomness. They go through a [`CryptoProvider`] handed to them at
//! construction, which lets tests swap in a fake. [`global`] returns the
//! process-wide default, initialized once on first use.

use crate::bip32::{self, ExtendedPrivateKey};
use crate::error::CryptoError;
use crate::hash;
use bip39::{Language, Mnemonic};
use curve25519_dalek::{EdwardsPoint, Scalar};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use stakeleaf_types::{codec, KeyHash};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Shared handle to a provider.
pub type Provider = Arc<dyn CryptoProvider>;

/// Black-box primitives used by the wallet core.
pub trait CryptoProvider: Send + Sync {
    /// Map entropy (with its checksum appended) onto word-list entries.
    fn entropy_to_mnemonic(&self, entropy: &[u8]) -> Result<String, CryptoError>;

    /// Recover entropy from a normalized phrase, verifying word list and checksum.
    fn mnemonic_to_entropy(&self, phrase: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Expand entropy and passphrase into a root extended private key.
    fn seed_expand(
        &self,
        entropy: &[u8],
        passphrase: &[u8],
    ) -> Result<ExtendedPrivateKey, CryptoError>;

    /// Derive the child at raw `index` (hardening offset already applied or not)
    /// from a private parent.
    fn derive_child(
        &self,
        parent: &ExtendedPrivateKey,
        index: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError>;

    /// Compressed Ed25519 public key of an extended private key.
    fn public_key(&self, key: &ExtendedPrivateKey) -> [u8; 32];

    /// 224-bit hash of a public key.
    fn key_hash(&self, public_key: &[u8; 32]) -> KeyHash;

    fn bech32_encode(&self, hrp: &str, payload: &[u8]) -> Result<String, CryptoError>;

    fn bech32_decode(&self, text: &str) -> Result<(String, Vec<u8>), CryptoError>;

    /// Fill `dest` from a cryptographically secure source.
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// Default provider backed by `bip39`, `pbkdf2`, `hmac`, `curve25519-dalek`,
/// `blake2`, `bech32` and the OS RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct Primitives;

impl CryptoProvider for Primitives {
    fn entropy_to_mnemonic(&self, entropy: &[u8]) -> Result<String, CryptoError> {
        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
            .map_err(|e| CryptoError::PrimitiveFailure(e.to_string()))?;
        Ok(mnemonic.to_string())
    }

    fn mnemonic_to_entropy(&self, phrase: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|_| CryptoError::InvalidMnemonic)?;
        Ok(Zeroizing::new(mnemonic.to_entropy()))
    }

    fn seed_expand(
        &self,
        entropy: &[u8],
        passphrase: &[u8],
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        Ok(bip32::icarus_root(entropy, passphrase))
    }

    fn derive_child(
        &self,
        parent: &ExtendedPrivateKey,
        index: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        let parent_public = self.public_key(parent);
        bip32::derive_child_v2(parent, &parent_public, index)
    }

    fn public_key(&self, key: &ExtendedPrivateKey) -> [u8; 32] {
        // kL is used unclamped: derived children need not keep the clamped form.
        let scalar = Zeroizing::new(Scalar::from_bytes_mod_order(*key.kl()));
        EdwardsPoint::mul_base(&scalar).compress().to_bytes()
    }

    fn key_hash(&self, public_key: &[u8; 32]) -> KeyHash {
        hash::key_hash(public_key)
    }

    fn bech32_encode(&self, hrp: &str, payload: &[u8]) -> Result<String, CryptoError> {
        Ok(codec::encode(hrp, payload)?)
    }

    fn bech32_decode(&self, text: &str) -> Result<(String, Vec<u8>), CryptoError> {
        codec::decode(text).map_err(|e| CryptoError::InvalidAddressEncoding(e.to_string()))
    }

    fn fill_random(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::PrimitiveFailure(format!("RNG error: {}", e)))
    }
}

static GLOBAL: Lazy<Provider> = Lazy::new(|| Arc::new(Primitives));

/// The process-wide provider.
pub fn global() -> Provider {
    Arc::clone(&GLOBAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&global(), &global()));
    }

    #[test]
    fn test_mnemonic_checksum_roundtrip() {
        let p = Primitives;
        let phrase = p.entropy_to_mnemonic(&[0u8; 16]).unwrap();
        assert_eq!(
            phrase,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
        assert_eq!(*p.mnemonic_to_entropy(&phrase).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn test_mnemonic_bad_checksum() {
        let p = Primitives;
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert_eq!(
            p.mnemonic_to_entropy(phrase).unwrap_err(),
            CryptoError::InvalidMnemonic
        );
    }

    #[test]
    fn test_entropy_to_mnemonic_bad_length() {
        assert!(matches!(
            Primitives.entropy_to_mnemonic(&[0u8; 15]),
            Err(CryptoError::PrimitiveFailure(_))
        ));
    }

    #[test]
    fn test_public_key_matches_signing_key_for_clamped_scalar() {
        // For a standard Ed25519 seed, the expanded scalar yields the same public key
        use sha2::{Digest, Sha512};
        let seed = [9u8; 32];
        let h = Sha512::digest(seed);
        let mut bytes = [0u8; 96];
        bytes[..64].copy_from_slice(&h);
        bytes[0] &= 0b1111_1000;
        bytes[31] &= 0b0111_1111;
        bytes[31] |= 0b0100_0000;
        let key = ExtendedPrivateKey::from_bytes(&bytes);

        let expected = ed25519_dalek::SigningKey::from_bytes(&seed)
            .verifying_key()
            .to_bytes();
        assert_eq!(Primitives.public_key(&key), expected);
    }

    #[test]
    fn test_fill_random() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        Primitives.fill_random(&mut a).unwrap();
        Primitives.fill_random(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bech32_decode_error_kind() {
        assert!(matches!(
            Primitives.bech32_decode("stake1qqqq"),
            Err(CryptoError::InvalidAddressEncoding(_))
        ));
    }
}
