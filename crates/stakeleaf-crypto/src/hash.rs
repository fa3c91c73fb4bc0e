use blake2::digest::consts::U28;
use blake2::{Blake2b, Digest};
use stakeleaf_types::KeyHash;

/// Blake2b with a 224-bit digest.
type Blake2b224 = Blake2b<U28>;

/// Compute the 28-byte Blake2b-224 digest of `data`.
pub fn blake2b_224(data: &[u8]) -> [u8; 28] {
    Blake2b224::digest(data).into()
}

/// Key hash of a 32-byte Ed25519 public key, as embedded in credentials.
pub fn key_hash(public_key: &[u8; 32]) -> KeyHash {
    KeyHash::from_bytes(blake2b_224(public_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2b_224_empty() {
        assert_eq!(
            hex::encode(blake2b_224(b"")),
            "836cc68931c2e4e3e838602eca1902591d216837bafddfe6f0c8cb07"
        );
    }

    #[test]
    fn test_key_hash_of_stake_key() {
        let mut pk = [0u8; 32];
        hex::decode_to_slice(
            "2c041c9c6a676ac54d25e2fdce44c56581e316ae43adc4c7bf17f23214d8d892",
            &mut pk,
        )
        .unwrap();
        assert_eq!(
            key_hash(&pk).to_hex(),
            "32c728d3861e164cab28cb8f006448139c8f1740ffb8e7aa9e5232dc"
        );
    }

    #[test]
    fn test_key_hash_deterministic() {
        let pk = [7u8; 32];
        assert_eq!(key_hash(&pk), key_hash(&pk));
        assert_ne!(key_hash(&pk), key_hash(&[8u8; 32]));
    }
}
