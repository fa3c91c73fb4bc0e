use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// 28-byte key hash (Blake2b-224 digest of an Ed25519 public key).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyHash([u8; 28]);

impl KeyHash {
    pub const LEN: usize = 28;

    pub const fn from_bytes(bytes: [u8; 28]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 28] {
        &self.0
    }

    /// Create from a byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        let bytes: [u8; 28] = slice
            .try_into()
            .map_err(|_| TypesError::InvalidKeyHashLength(slice.len()))?;
        Ok(Self(bytes))
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash({})", self.to_hex())
    }
}

impl FromStr for KeyHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for KeyHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Credential identifying a staking right. Shared by every address of an account.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StakeCredential(KeyHash);

/// Credential authorising spends from a base address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PaymentCredential(KeyHash);

impl StakeCredential {
    pub const fn from_key_hash(hash: KeyHash) -> Self {
        Self(hash)
    }

    pub const fn key_hash(&self) -> &KeyHash {
        &self.0
    }
}

impl PaymentCredential {
    pub const fn from_key_hash(hash: KeyHash) -> Self {
        Self(hash)
    }

    pub const fn key_hash(&self) -> &KeyHash {
        &self.0
    }
}

impl fmt::Display for StakeCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for PaymentCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_hash_from_slice() {
        let hash = KeyHash::from_slice(&[7u8; 28]).unwrap();
        assert_eq!(hash.as_bytes(), &[7u8; 28]);

        assert_eq!(
            KeyHash::from_slice(&[0u8; 32]),
            Err(TypesError::InvalidKeyHashLength(32))
        );
    }

    #[test]
    fn test_key_hash_hex_roundtrip() {
        let hex = "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
        let hash: KeyHash = hex.parse().unwrap();
        assert_eq!(hash.to_string(), hex);
    }

    #[test]
    fn test_credentials_wrap_same_hash() {
        let hash = KeyHash::from_bytes([1u8; 28]);
        let stake = StakeCredential::from_key_hash(hash);
        let payment = PaymentCredential::from_key_hash(hash);
        assert_eq!(stake.key_hash(), payment.key_hash());
        assert_eq!(stake.to_string(), hash.to_hex());
    }
}
