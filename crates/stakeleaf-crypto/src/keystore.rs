//! Password-protected key envelopes.
//!
//! Argon2id derives a 32-byte key from the password and a random salt; AES-256-GCM
//! encrypts the 96-byte extended private key under a random nonce. The envelope
//! version and the stored extended public key are bound as associated data.
//! The JSON form carries everything needed to decrypt, so cost parameters can
//! change between envelopes.

use crate::bip32::{ExtendedPrivateKey, ExtendedPublicKey};
use crate::error::CryptoError;
use crate::provider::{self, Provider};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::Aes256Gcm;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

pub const ENVELOPE_VERSION: u32 = 1;
pub const CIPHER: &str = "aes-256-gcm";
pub const KDF: &str = "argon2id";

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Upper bound on accepted Argon2 memory cost (4 GiB, in KiB).
const MAX_MEMORY_COST: u32 = 4 * 1024 * 1024;

/// Domain separator prefixed to the associated data.
const AAD_DOMAIN: &[u8] = b"stakeleaf-key-envelope";

/// Argon2id cost parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    /// Lanes
    pub parallelism: u32,
}

impl KdfParams {
    pub const fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Minimal cost. Only for tests and throwaway wallets.
    pub const fn insecure_fast() -> Self {
        Self::new(256, 1, 1)
    }

    fn argon2(&self) -> Result<Argon2<'static>, CryptoError> {
        if self.memory_cost > MAX_MEMORY_COST {
            return Err(CryptoError::InvalidEnvelope(format!(
                "memory cost {} KiB exceeds {} KiB",
                self.memory_cost, MAX_MEMORY_COST
            )));
        }
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CryptoError::InvalidEnvelope(format!("argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(65536, 3, 4)
    }
}

/// Encrypted private key plus everything needed to reverse the encryption.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKeyEnvelope {
    pub version: u32,
    /// UUID v4
    pub id: String,
    /// hex, extended public key of the encrypted key
    pub public_key: String,
    pub crypto: EnvelopeCrypto,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeCrypto {
    pub cipher: String,
    /// hex
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    /// hex, 16 bytes
    pub tag: String,
    pub kdf: String,
    pub kdfparams: EnvelopeKdfParams,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CipherParams {
    /// hex, 12 bytes
    pub nonce: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeKdfParams {
    /// hex, 16 bytes
    pub salt: String,
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_len: u32,
}

impl EncryptedKeyEnvelope {
    /// Check version and algorithm names. Runs before any key derivation.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.version != ENVELOPE_VERSION {
            return Err(CryptoError::InvalidEnvelope(format!(
                "unsupported version: {}",
                self.version
            )));
        }
        if self.crypto.cipher != CIPHER {
            return Err(CryptoError::InvalidEnvelope(format!(
                "unsupported cipher: {}",
                self.crypto.cipher
            )));
        }
        if self.crypto.kdf != KDF {
            return Err(CryptoError::InvalidEnvelope(format!(
                "unsupported kdf: {}",
                self.crypto.kdf
            )));
        }
        if self.crypto.kdfparams.output_len as usize != KEY_LEN {
            return Err(CryptoError::InvalidEnvelope(format!(
                "unsupported kdf output length: {}",
                self.crypto.kdfparams.output_len
            )));
        }
        Ok(())
    }

    pub fn kdf_params(&self) -> KdfParams {
        let p = &self.crypto.kdfparams;
        KdfParams::new(p.memory_cost, p.time_cost, p.parallelism)
    }

    /// The stored extended public key. Readable without the password.
    pub fn extended_public_key(&self) -> Result<ExtendedPublicKey, CryptoError> {
        let bytes = hex::decode(&self.public_key)
            .map_err(|e| CryptoError::InvalidEnvelope(format!("public key: {}", e)))?;
        ExtendedPublicKey::from_slice(&bytes)
    }

    pub fn to_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string_pretty(self).map_err(|e| CryptoError::InvalidEnvelope(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        let envelope: Self = serde_json::from_str(json)
            .map_err(|e| CryptoError::InvalidEnvelope(format!("parse error: {}", e)))?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Write the envelope as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Whether `path` holds a well-formed envelope.
    pub fn check(path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        Self::load(path).is_ok()
    }
}

fn associated_data(version: u32, public_key: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(AAD_DOMAIN.len() + 4 + public_key.len());
    aad.extend_from_slice(AAD_DOMAIN);
    aad.extend_from_slice(&version.to_le_bytes());
    aad.extend_from_slice(public_key);
    aad
}

fn derive_symmetric_key(
    params: &KdfParams,
    password: &str,
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let argon2 = params.argon2()?;
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| CryptoError::PrimitiveFailure(format!("argon2: {}", e)))?;
    Ok(key)
}

/// Envelope encryption over an injected primitives provider.
#[derive(Clone)]
pub struct KeyVault {
    provider: Provider,
    params: KdfParams,
}

impl KeyVault {
    pub fn new(provider: Provider, params: KdfParams) -> Self {
        Self { provider, params }
    }

    /// Vault on the process-wide provider with the given cost parameters.
    pub fn with_params(params: KdfParams) -> Self {
        Self::new(provider::global(), params)
    }

    pub fn global() -> Self {
        Self::with_params(KdfParams::default())
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt `key` under `password` with a fresh salt and nonce.
    pub fn encrypt(
        &self,
        key: &ExtendedPrivateKey,
        password: &str,
    ) -> Result<EncryptedKeyEnvelope, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        self.provider.fill_random(&mut salt)?;
        self.provider.fill_random(&mut nonce)?;

        let xpub = ExtendedPublicKey::new(self.provider.public_key(key), *key.chain_code());
        let aad = associated_data(ENVELOPE_VERSION, &xpub.to_bytes());

        let sym_key = derive_symmetric_key(&self.params, password, &salt)?;
        let cipher = Aes256Gcm::new_from_slice(&sym_key[..])
            .map_err(|e| CryptoError::PrimitiveFailure(e.to_string()))?;

        let mut buffer = key.to_bytes();
        let tag = cipher
            .encrypt_in_place_detached(GenericArray::from_slice(&nonce), &aad, &mut buffer[..])
            .map_err(|_| CryptoError::PrimitiveFailure("AES-GCM encryption failed".into()))?;

        let envelope = EncryptedKeyEnvelope {
            version: ENVELOPE_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            public_key: xpub.to_hex(),
            crypto: EnvelopeCrypto {
                cipher: CIPHER.to_string(),
                ciphertext: hex::encode(&buffer[..]),
                cipherparams: CipherParams {
                    nonce: hex::encode(nonce),
                },
                tag: hex::encode(tag),
                kdf: KDF.to_string(),
                kdfparams: EnvelopeKdfParams {
                    salt: hex::encode(salt),
                    memory_cost: self.params.memory_cost,
                    time_cost: self.params.time_cost,
                    parallelism: self.params.parallelism,
                    output_len: KEY_LEN as u32,
                },
            },
        };

        tracing::debug!(
            id = %envelope.id,
            memory_cost = self.params.memory_cost,
            time_cost = self.params.time_cost,
            parallelism = self.params.parallelism,
            "Encrypted key envelope"
        );

        Ok(envelope)
    }

    /// Recover the key. Any failure past format validation is
    /// `WrongPasswordOrCorruptData`, whatever its cause.
    pub fn decrypt(
        &self,
        password: &str,
        envelope: &EncryptedKeyEnvelope,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        envelope.validate()?;
        let params = envelope.kdf_params();
        params.argon2()?;

        let opened = open(envelope, |salt| derive_symmetric_key(&params, password, salt));
        if opened.is_err() {
            tracing::debug!(id = %envelope.id, "Key envelope did not open");
        }
        opened.map_err(|_| CryptoError::WrongPasswordOrCorruptData)
    }
}

impl Default for KeyVault {
    fn default() -> Self {
        Self::global()
    }
}

/// Opens `envelope` with the key `derive_key` produces from the stored salt.
///
/// The KDF runs before any field is checked, with a fixed salt when the
/// stored one is unusable, so a damaged envelope costs as much to reject as
/// a wrong password.
fn open<F>(
    envelope: &EncryptedKeyEnvelope,
    derive_key: F,
) -> Result<ExtendedPrivateKey, CryptoError>
where
    F: FnOnce(&[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError>,
{
    let corrupt = CryptoError::WrongPasswordOrCorruptData;
    let crypto = &envelope.crypto;

    let salt = hex::decode(&crypto.kdfparams.salt)
        .ok()
        .filter(|salt| salt.len() == SALT_LEN);
    let sym_key = derive_key(salt.as_deref().unwrap_or(&[0u8; SALT_LEN]));

    let nonce = hex::decode(&crypto.cipherparams.nonce).ok();
    let tag = hex::decode(&crypto.tag).ok();
    let public_key = hex::decode(&envelope.public_key).ok();
    let buffer = hex::decode(&crypto.ciphertext).ok().map(Zeroizing::new);

    let (Some(_), Ok(sym_key), Some(nonce), Some(tag), Some(public_key), Some(mut buffer)) =
        (salt, sym_key, nonce, tag, public_key, buffer)
    else {
        return Err(corrupt);
    };
    if nonce.len() != NONCE_LEN
        || tag.len() != TAG_LEN
        || buffer.len() != ExtendedPrivateKey::LEN
    {
        return Err(corrupt);
    }

    let cipher = Aes256Gcm::new_from_slice(&sym_key[..]).map_err(|_| corrupt.clone())?;
    let aad = associated_data(envelope.version, &public_key);
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&nonce),
            &aad,
            &mut buffer[..],
            GenericArray::from_slice(&tag),
        )
        .map_err(|_| corrupt)?;

    ExtendedPrivateKey::from_slice(&buffer)
}

/// Encrypt with the global provider and default cost.
pub fn encrypt(
    key: &ExtendedPrivateKey,
    password: &str,
) -> Result<EncryptedKeyEnvelope, CryptoError> {
    KeyVault::global().encrypt(key, password)
}

/// Decrypt with the global provider. Cost parameters come from the envelope.
pub fn decrypt(
    password: &str,
    envelope: &EncryptedKeyEnvelope,
) -> Result<ExtendedPrivateKey, CryptoError> {
    KeyVault::global().decrypt(password, envelope)
}
