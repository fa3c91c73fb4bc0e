use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Network discriminant carried in the low nibble of every address header.
///
/// The value is echoed verbatim into encoded addresses; it is never inferred
/// from anything else. `0` is the test network, `1` is main.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NetworkId(u8);

impl NetworkId {
    pub const TESTNET: Self = Self(0);
    pub const MAINNET: Self = Self(1);

    /// Largest id that fits in the header nibble.
    pub const MAX: u8 = 0x0f;

    /// Bech32 prefixes (CIP-5).
    pub const REWARD_HRP_MAINNET: &'static str = "stake";
    pub const REWARD_HRP_TESTNET: &'static str = "stake_test";
    pub const BASE_HRP_MAINNET: &'static str = "addr";
    pub const BASE_HRP_TESTNET: &'static str = "addr_test";

    pub fn new(id: u8) -> Result<Self, TypesError> {
        if id > Self::MAX {
            return Err(TypesError::InvalidNetworkId(id));
        }
        Ok(Self(id))
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn is_mainnet(&self) -> bool {
        *self == Self::MAINNET
    }

    /// Prefix for reward (stake) addresses on this network.
    pub fn reward_hrp(&self) -> &'static str {
        if self.is_mainnet() {
            Self::REWARD_HRP_MAINNET
        } else {
            Self::REWARD_HRP_TESTNET
        }
    }

    /// Prefix for base (payment) addresses on this network.
    pub fn base_hrp(&self) -> &'static str {
        if self.is_mainnet() {
            Self::BASE_HRP_MAINNET
        } else {
            Self::BASE_HRP_TESTNET
        }
    }
}

impl TryFrom<u8> for NetworkId {
    type Error = TypesError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<NetworkId> for u8 {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "testnet"),
            1 => write!(f, "mainnet"),
            n => write!(f, "network-{}", n),
        }
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkId({})", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = TypesError;

    /// Accepts `mainnet`, `testnet`, or a bare number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::MAINNET),
            "testnet" | "test" => Ok(Self::TESTNET),
            other => {
                let id: u8 = other
                    .parse()
                    .map_err(|_| TypesError::InvalidNetworkName(s.to_string()))?;
                Self::new(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_constants() {
        assert_eq!(NetworkId::TESTNET.as_u8(), 0);
        assert_eq!(NetworkId::MAINNET.as_u8(), 1);
        assert!(NetworkId::MAINNET.is_mainnet());
        assert!(!NetworkId::TESTNET.is_mainnet());
        assert_eq!(NetworkId::default(), NetworkId::TESTNET);
    }

    #[test]
    fn test_network_id_range() {
        assert!(NetworkId::new(15).is_ok());
        assert_eq!(NetworkId::new(16), Err(TypesError::InvalidNetworkId(16)));
    }

    #[test]
    fn test_network_prefixes() {
        assert_eq!(NetworkId::MAINNET.reward_hrp(), "stake");
        assert_eq!(NetworkId::MAINNET.base_hrp(), "addr");
        assert_eq!(NetworkId::TESTNET.reward_hrp(), "stake_test");
        assert_eq!(NetworkId::TESTNET.base_hrp(), "addr_test");
        // Any non-main network uses the test prefixes
        assert_eq!(NetworkId::new(7).unwrap().base_hrp(), "addr_test");
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("mainnet".parse::<NetworkId>().unwrap(), NetworkId::MAINNET);
        assert_eq!("Testnet".parse::<NetworkId>().unwrap(), NetworkId::TESTNET);
        assert_eq!("3".parse::<NetworkId>().unwrap().as_u8(), 3);
        assert!("preprod".parse::<NetworkId>().is_err());
        assert!("42".parse::<NetworkId>().is_err());
    }
}
