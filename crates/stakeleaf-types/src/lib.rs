//! Stakeleaf Types - Plain value types for CIP-1852 wallets.
//!
//! This crate provides the non-secret types shared by the wallet core:
//! - Network ids (address header nibble, bech32 prefixes)
//! - Key hashes and stake/payment credentials (28-byte Blake2b-224 digests)
//! - Derivation paths (`m/1852'/1815'/account'/chain/index`)
//! - Reward and base addresses with their bech32 text codec

pub mod address;
pub mod codec;
pub mod credential;
pub mod error;
pub mod network;
pub mod path;

mod serialization;

pub use address::Address;
pub use credential::{KeyHash, PaymentCredential, StakeCredential};
pub use error::TypesError;
pub use network::NetworkId;
pub use path::{harden, Chain, ChildIndex, DerivationPath, COIN_TYPE, HARDENED_OFFSET, PURPOSE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Address, Chain, ChildIndex, DerivationPath, KeyHash, NetworkId, PaymentCredential,
        StakeCredential, TypesError,
    };
}
