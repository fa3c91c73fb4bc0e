use crate::codec;
use crate::credential::{KeyHash, PaymentCredential, StakeCredential};
use crate::error::TypesError;
use crate::network::NetworkId;
use std::fmt;
use std::str::FromStr;

/// Network-tagged address built from key-hash credentials (CIP-19).
///
/// # Layout
/// - reward: `0b1110_nnnn || stake_hash` (29 bytes)
/// - base:   `0b0000_nnnn || payment_hash || stake_hash` (57 bytes)
///
/// `nnnn` is the network id. Display format is bech32 with a `stake`/`addr`
/// prefix (`_test` suffix off mainnet).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Reward {
        network: NetworkId,
        stake: StakeCredential,
    },
    Base {
        network: NetworkId,
        payment: PaymentCredential,
        stake: StakeCredential,
    },
}

impl Address {
    /// Header type for a base address with key-hash payment and stake parts.
    pub const BASE_HEADER: u8 = 0b0000_0000;
    /// Header type for a reward address with a key-hash stake part.
    pub const REWARD_HEADER: u8 = 0b1110_0000;

    pub const REWARD_LEN: usize = 1 + KeyHash::LEN;
    pub const BASE_LEN: usize = 1 + 2 * KeyHash::LEN;

    pub const fn reward(network: NetworkId, stake: StakeCredential) -> Self {
        Address::Reward { network, stake }
    }

    pub const fn base(
        network: NetworkId,
        payment: PaymentCredential,
        stake: StakeCredential,
    ) -> Self {
        Address::Base {
            network,
            payment,
            stake,
        }
    }

    pub fn network_id(&self) -> NetworkId {
        match self {
            Address::Reward { network, .. } | Address::Base { network, .. } => *network,
        }
    }

    /// The stake credential; every variant carries one.
    pub fn stake_credential(&self) -> &StakeCredential {
        match self {
            Address::Reward { stake, .. } | Address::Base { stake, .. } => stake,
        }
    }

    /// The payment credential, for base addresses.
    pub fn payment_credential(&self) -> Option<&PaymentCredential> {
        match self {
            Address::Reward { .. } => None,
            Address::Base { payment, .. } => Some(payment),
        }
    }

    pub fn is_reward(&self) -> bool {
        matches!(self, Address::Reward { .. })
    }

    /// Bech32 prefix for this address.
    pub fn hrp(&self) -> &'static str {
        match self {
            Address::Reward { network, .. } => network.reward_hrp(),
            Address::Base { network, .. } => network.base_hrp(),
        }
    }

    fn header(&self) -> u8 {
        match self {
            Address::Reward { network, .. } => Self::REWARD_HEADER | network.as_u8(),
            Address::Base { network, .. } => Self::BASE_HEADER | network.as_u8(),
        }
    }

    /// Raw address bytes (header followed by credentials).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BASE_LEN);
        out.push(self.header());
        match self {
            Address::Reward { stake, .. } => {
                out.extend_from_slice(stake.key_hash().as_bytes());
            }
            Address::Base { payment, stake, .. } => {
                out.extend_from_slice(payment.key_hash().as_bytes());
                out.extend_from_slice(stake.key_hash().as_bytes());
            }
        }
        out
    }

    /// Parse raw address bytes. Only key-hash reward and base addresses are accepted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        let (&header, body) = bytes
            .split_first()
            .ok_or(TypesError::InvalidAddressLength {
                expected: Self::REWARD_LEN,
                actual: 0,
            })?;
        let network = NetworkId::new(header & 0x0f)?;

        match header & 0xf0 {
            Self::REWARD_HEADER => {
                if bytes.len() != Self::REWARD_LEN {
                    return Err(TypesError::InvalidAddressLength {
                        expected: Self::REWARD_LEN,
                        actual: bytes.len(),
                    });
                }
                let stake = StakeCredential::from_key_hash(KeyHash::from_slice(body)?);
                Ok(Self::reward(network, stake))
            }
            Self::BASE_HEADER => {
                if bytes.len() != Self::BASE_LEN {
                    return Err(TypesError::InvalidAddressLength {
                        expected: Self::BASE_LEN,
                        actual: bytes.len(),
                    });
                }
                let (payment, stake) = body.split_at(KeyHash::LEN);
                Ok(Self::base(
                    network,
                    PaymentCredential::from_key_hash(KeyHash::from_slice(payment)?),
                    StakeCredential::from_key_hash(KeyHash::from_slice(stake)?),
                ))
            }
            _ => Err(TypesError::UnsupportedAddressHeader(header)),
        }
    }

    /// Encode as bech32 text.
    pub fn to_bech32(&self) -> Result<String, TypesError> {
        codec::encode(self.hrp(), &self.to_bytes())
    }

    /// Decode bech32 text. The prefix must agree with the header's kind and network.
    pub fn from_bech32(text: &str) -> Result<Self, TypesError> {
        let (hrp, payload) = codec::decode(text)?;
        let address = Self::from_bytes(&payload)?;

        if hrp != address.hrp() {
            return Err(TypesError::InvalidAddressFormat(format!(
                "prefix '{}' does not match {} address on {}",
                hrp,
                if address.is_reward() { "reward" } else { "base" },
                address.network_id()
            )));
        }

        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(encoded) => write!(f, "{}", encoded),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Reward { network, stake } => {
                write!(f, "Address::Reward({:?}, stake={})", network, stake)
            }
            Address::Base {
                network,
                payment,
                stake,
            } => write!(
                f,
                "Address::Base({:?}, payment={}, stake={})",
                network, payment, stake
            ),
        }
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s.trim())
    }
}
