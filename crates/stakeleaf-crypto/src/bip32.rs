//! Ed25519-BIP32 extended keys and the key derivation engine.
//!
//! Root keys follow the Icarus master-key generation (CIP-3); children follow
//! derivation scheme V2 and are always computed from the private parent.

use crate::error::CryptoError;
use crate::provider::{self, Provider};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use stakeleaf_types::{
    codec, harden, Chain, DerivationPath, KeyHash, COIN_TYPE, HARDENED_OFFSET, PURPOSE,
};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// PBKDF2 rounds for Icarus root generation.
pub const ICARUS_PBKDF2_ROUNDS: u32 = 4096;

/// Bech32 prefix of an exported account public key.
pub const ACCOUNT_XPUB_HRP: &str = "acct_xvk";

/// Extended private key: `kL || kR || chain_code`, 32 bytes each.
/// Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedPrivateKey {
    kl: [u8; 32],
    kr: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedPrivateKey {
    pub const LEN: usize = 96;

    pub fn from_bytes(bytes: &[u8; 96]) -> Self {
        let mut key = Self {
            kl: [0u8; 32],
            kr: [0u8; 32],
            chain_code: [0u8; 32],
        };
        key.kl.copy_from_slice(&bytes[..32]);
        key.kr.copy_from_slice(&bytes[32..64]);
        key.chain_code.copy_from_slice(&bytes[64..]);
        key
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: &[u8; 96] = slice.try_into().map_err(|_| {
            CryptoError::PrimitiveFailure(format!(
                "extended private key must be 96 bytes, got {}",
                slice.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Serialized key (CAUTION: sensitive)
    pub fn to_bytes(&self) -> Zeroizing<[u8; 96]> {
        let mut out = Zeroizing::new([0u8; 96]);
        out[..32].copy_from_slice(&self.kl);
        out[32..64].copy_from_slice(&self.kr);
        out[64..].copy_from_slice(&self.chain_code);
        out
    }

    /// Left half of the extended scalar.
    pub fn kl(&self) -> &[u8; 32] {
        &self.kl
    }

    /// Right half of the extended scalar.
    pub fn kr(&self) -> &[u8; 32] {
        &self.kr
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}

impl PartialEq for ExtendedPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.kl == other.kl && self.kr == other.kr && self.chain_code == other.chain_code
    }
}

impl Eq for ExtendedPrivateKey {}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedPrivateKey(<redacted>)")
    }
}

/// Extended public key: compressed Ed25519 point plus chain code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedPublicKey {
    public_key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedPublicKey {
    pub const LEN: usize = 64;

    pub const fn new(public_key: [u8; 32], chain_code: [u8; 32]) -> Self {
        Self {
            public_key,
            chain_code,
        }
    }

    /// Parse `public_key || chain_code`. The key must be a valid curve point.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        if slice.len() != Self::LEN {
            return Err(CryptoError::PrimitiveFailure(format!(
                "extended public key must be 64 bytes, got {}",
                slice.len()
            )));
        }
        let mut public_key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        public_key.copy_from_slice(&slice[..32]);
        chain_code.copy_from_slice(&slice[32..]);

        ed25519_dalek::VerifyingKey::from_bytes(&public_key)
            .map_err(|_| CryptoError::PrimitiveFailure("invalid Ed25519 public key".into()))?;

        Ok(Self::new(public_key, chain_code))
    }

    /// Parse an `acct_xvk1...` export.
    pub fn from_bech32(text: &str) -> Result<Self, CryptoError> {
        let (hrp, payload) = codec::decode(text)?;
        if hrp != ACCOUNT_XPUB_HRP {
            return Err(CryptoError::InvalidAddressEncoding(format!(
                "expected '{}' prefix, got '{}'",
                ACCOUNT_XPUB_HRP, hrp
            )));
        }
        Self::from_slice(&payload)
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.public_key);
        out[32..].copy_from_slice(&self.chain_code);
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Blake2b-224 hash of the public key.
    pub fn key_hash(&self) -> KeyHash {
        crate::hash::key_hash(&self.public_key)
    }

    /// Watch-only export (`acct_xvk1...`).
    pub fn to_bech32(&self) -> Result<String, CryptoError> {
        Ok(codec::encode(ACCOUNT_XPUB_HRP, &self.to_bytes())?)
    }
}

impl fmt::Debug for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedPublicKey({})", self.to_hex())
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Icarus master key generation: PBKDF2-HMAC-SHA512 over the entropy, then clamping.
pub(crate) fn icarus_root(entropy: &[u8], passphrase: &[u8]) -> ExtendedPrivateKey {
    let mut out = Zeroizing::new([0u8; 96]);
    pbkdf2::pbkdf2_hmac::<Sha512>(passphrase, entropy, ICARUS_PBKDF2_ROUNDS, &mut out[..]);

    out[0] &= 0b1111_1000;
    out[31] &= 0b0001_1111;
    out[31] |= 0b0100_0000;

    ExtendedPrivateKey::from_bytes(&out)
}

/// Child derivation (scheme V2). `parent_public` is only consulted for soft indices.
pub(crate) fn derive_child_v2(
    parent: &ExtendedPrivateKey,
    parent_public: &[u8; 32],
    index: u32,
) -> Result<ExtendedPrivateKey, CryptoError> {
    let cc = parent.chain_code();
    let mut z_mac = HmacSha512::new_from_slice(cc)
        .map_err(|e| CryptoError::PrimitiveFailure(e.to_string()))?;
    let mut c_mac = z_mac.clone();

    let index_le = index.to_le_bytes();
    if index >= HARDENED_OFFSET {
        z_mac.update(&[0x00]);
        z_mac.update(parent.kl());
        z_mac.update(parent.kr());
        c_mac.update(&[0x01]);
        c_mac.update(parent.kl());
        c_mac.update(parent.kr());
    } else {
        z_mac.update(&[0x02]);
        z_mac.update(parent_public);
        c_mac.update(&[0x03]);
        c_mac.update(parent_public);
    }
    z_mac.update(&index_le);
    c_mac.update(&index_le);

    let mut z = Zeroizing::new([0u8; 64]);
    z.copy_from_slice(&z_mac.finalize().into_bytes());
    let mut c = Zeroizing::new([0u8; 64]);
    c.copy_from_slice(&c_mac.finalize().into_bytes());

    let mut child = Zeroizing::new([0u8; 96]);
    add_28_mul8(parent.kl(), &z[..32], &mut child[..32]);
    add_256(parent.kr(), &z[32..], &mut child[32..64]);
    child[64..].copy_from_slice(&c[32..]);

    Ok(ExtendedPrivateKey::from_bytes(&child))
}

/// `out = x + 8 * trunc28(y)`, little-endian, overflow past 256 bits dropped.
fn add_28_mul8(x: &[u8], y: &[u8], out: &mut [u8]) {
    let mut carry: u16 = 0;
    for i in 0..28 {
        let r = x[i] as u16 + ((y[i] as u16) << 3) + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
    for i in 28..32 {
        let r = x[i] as u16 + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
}

/// `out = x + y mod 2^256`, little-endian.
fn add_256(x: &[u8], y: &[u8], out: &mut [u8]) {
    let mut carry: u16 = 0;
    for i in 0..32 {
        let r = x[i] as u16 + y[i] as u16 + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
}

/// Key derivation engine over an injected primitives provider.
#[derive(Clone)]
pub struct KeyDeriver {
    provider: Provider,
}

impl KeyDeriver {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    /// Engine bound to the process-wide provider.
    pub fn global() -> Self {
        Self::new(provider::global())
    }

    /// Expand entropy (and an optional passphrase) into the root key.
    pub fn root_key_from_entropy(
        &self,
        entropy: &[u8],
        passphrase: &str,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        self.provider.seed_expand(entropy, passphrase.as_bytes())
    }

    /// Hardened child at `index`. The offset is applied here; passing an
    /// already-hardened index fails with `DerivationOverflow`.
    pub fn derive_hardened(
        &self,
        parent: &ExtendedPrivateKey,
        index: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        let index = harden(index)?;
        self.provider.derive_child(parent, index)
    }

    /// `root / 1852' / 1815' / account'`
    pub fn derive_account_key(
        &self,
        root: &ExtendedPrivateKey,
        account: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        let purpose = self.derive_hardened(root, PURPOSE)?;
        let coin = self.derive_hardened(&purpose, COIN_TYPE)?;
        self.derive_hardened(&coin, account)
    }

    /// `account / chain / index`, both segments soft as the path encodes them.
    pub fn derive_chain_index_key(
        &self,
        account_key: &ExtendedPrivateKey,
        chain: Chain,
        index: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        let chain_key = self.provider.derive_child(account_key, chain.as_u32())?;
        self.derive_soft(&chain_key, index)
    }

    fn derive_soft(
        &self,
        parent: &ExtendedPrivateKey,
        index: u32,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        if index >= HARDENED_OFFSET {
            return Err(CryptoError::DerivationOverflow(index));
        }
        self.provider.derive_child(parent, index)
    }

    pub fn public_key(&self, key: &ExtendedPrivateKey) -> ExtendedPublicKey {
        ExtendedPublicKey::new(self.provider.public_key(key), *key.chain_code())
    }

    /// Keys at `[start, start + count)` on `chain`, in index order.
    pub fn derive_range(
        &self,
        account_key: &ExtendedPrivateKey,
        chain: Chain,
        start: u32,
        count: u32,
    ) -> Result<Vec<ExtendedPrivateKey>, CryptoError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let last = start
            .checked_add(count - 1)
            .filter(|last| *last < HARDENED_OFFSET)
            .ok_or(CryptoError::DerivationOverflow(start.saturating_add(count - 1)))?;

        let chain_key = self.provider.derive_child(account_key, chain.as_u32())?;
        (start..=last)
            .map(|index| self.provider.derive_child(&chain_key, index))
            .collect()
    }

    /// Walk an arbitrary path from `root`. Segments carrying an index at or
    /// above the hardening offset are rejected, whatever their variant.
    pub fn derive_path(
        &self,
        root: &ExtendedPrivateKey,
        path: &DerivationPath,
    ) -> Result<ExtendedPrivateKey, CryptoError> {
        let mut key = root.clone();
        for index in path {
            if index.index() >= HARDENED_OFFSET {
                return Err(CryptoError::DerivationOverflow(index.index()));
            }
            key = self.provider.derive_child(&key, index.to_u32())?;
        }
        Ok(key)
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDeriver").finish_non_exhaustive()
    }
}
