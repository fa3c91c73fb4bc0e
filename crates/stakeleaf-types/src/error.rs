use thiserror::Error;

/// Errors that can occur in type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid address format: {0}")]
    InvalidAddressFormat(String),

    #[error("Invalid address length: expected {expected}, got {actual}")]
    InvalidAddressLength { expected: usize, actual: usize },

    #[error("Unsupported address header: 0x{0:02x}")]
    UnsupportedAddressHeader(u8),

    #[error("Invalid key hash length: expected 28, got {0}")]
    InvalidKeyHashLength(usize),

    #[error("Invalid network id: {0} (must be 0..=15)")]
    InvalidNetworkId(u8),

    #[error("Invalid network name: {0}")]
    InvalidNetworkName(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Bech32 error: {0}")]
    Bech32Error(String),

    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("Child index {0} is already in the hardened range")]
    IndexOutOfRange(u32),

    #[error("Invalid chain: {0}")]
    InvalidChain(u32),
}

impl TypesError {
    /// Whether this error came from decoding address text or bytes.
    pub fn is_address_encoding(&self) -> bool {
        matches!(
            self,
            TypesError::InvalidAddressFormat(_)
                | TypesError::InvalidAddressLength { .. }
                | TypesError::UnsupportedAddressHeader(_)
                | TypesError::Bech32Error(_)
                | TypesError::InvalidNetworkId(_)
        )
    }
}

impl From<hex::FromHexError> for TypesError {
    fn from(e: hex::FromHexError) -> Self {
        TypesError::InvalidHex(e.to_string())
    }
}

impl From<std::num::ParseIntError> for TypesError {
    fn from(e: std::num::ParseIntError) -> Self {
        TypesError::InvalidDerivationPath(e.to_string())
    }
}
