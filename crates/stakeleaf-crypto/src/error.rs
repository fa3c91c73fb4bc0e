use stakeleaf_types::TypesError;
use thiserror::Error;

/// Errors that can occur in wallet key operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CryptoError {
    #[error("Invalid mnemonic strength: {0} bits (expected 128, 160, 192, 224 or 256)")]
    InvalidStrength(usize),

    #[error("Invalid mnemonic")]
    InvalidMnemonic,

    #[error("Child index {0} is already in the hardened range")]
    DerivationOverflow(u32),

    #[error("Chain {0} does not carry payment keys")]
    InvalidChain(u32),

    #[error("Primitive failure: {0}")]
    PrimitiveFailure(String),

    #[error("Wrong password or corrupt data")]
    WrongPasswordOrCorruptData,

    #[error("Invalid address encoding: {0}")]
    InvalidAddressEncoding(String),

    #[error("Invalid key envelope: {0}")]
    InvalidEnvelope(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CryptoError {
    /// Validation failures the caller can recover from by re-prompting or regenerating.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidStrength(_) | CryptoError::InvalidMnemonic
        )
    }
}

impl From<TypesError> for CryptoError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::IndexOutOfRange(index) => CryptoError::DerivationOverflow(index),
            TypesError::InvalidChain(chain) => CryptoError::InvalidChain(chain),
            e if e.is_address_encoding() => CryptoError::InvalidAddressEncoding(e.to_string()),
            e => CryptoError::PrimitiveFailure(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CryptoError {
    fn from(e: std::io::Error) -> Self {
        CryptoError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_error_mapping() {
        assert_eq!(
            CryptoError::from(TypesError::IndexOutOfRange(0x8000_0001)),
            CryptoError::DerivationOverflow(0x8000_0001)
        );
        assert!(matches!(
            CryptoError::from(TypesError::Bech32Error("bad checksum".into())),
            CryptoError::InvalidAddressEncoding(_)
        ));
        assert_eq!(
            CryptoError::from(TypesError::InvalidChain(7)),
            CryptoError::InvalidChain(7)
        );
        assert!(matches!(
            CryptoError::from(TypesError::InvalidKeyHashLength(3)),
            CryptoError::PrimitiveFailure(_)
        ));
    }

    #[test]
    fn test_recoverable() {
        assert!(CryptoError::InvalidMnemonic.is_recoverable());
        assert!(CryptoError::InvalidStrength(100).is_recoverable());
        assert!(!CryptoError::WrongPasswordOrCorruptData.is_recoverable());
    }
}
