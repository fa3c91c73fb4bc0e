//! CIP-1852 derivation paths.
//!
//! Paths look like `m/1852'/1815'/0'/0/0`: purpose, coin type and account are
//! hardened; chain and address index are not.

use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Offset added to a child index to select hardened derivation (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// CIP-1852 purpose.
pub const PURPOSE: u32 = 1852;

/// SLIP-44 coin type for ada.
pub const COIN_TYPE: u32 = 1815;

/// Apply the hardening offset. Fails if `index` is already in the hardened range.
pub fn harden(index: u32) -> Result<u32, TypesError> {
    if index >= HARDENED_OFFSET {
        return Err(TypesError::IndexOutOfRange(index));
    }
    Ok(index | HARDENED_OFFSET)
}

/// A single path segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildIndex {
    /// Soft index: 0 to 2^31 - 1
    Normal(u32),
    /// Hardened index, stored without the offset
    Hardened(u32),
}

impl ChildIndex {
    pub fn normal(index: u32) -> Result<Self, TypesError> {
        if index >= HARDENED_OFFSET {
            return Err(TypesError::IndexOutOfRange(index));
        }
        Ok(Self::Normal(index))
    }

    pub fn hardened(index: u32) -> Result<Self, TypesError> {
        if index >= HARDENED_OFFSET {
            return Err(TypesError::IndexOutOfRange(index));
        }
        Ok(Self::Hardened(index))
    }

    pub const fn is_hardened(&self) -> bool {
        matches!(self, Self::Hardened(_))
    }

    /// Index without the hardening offset.
    pub const fn index(&self) -> u32 {
        match self {
            Self::Normal(i) | Self::Hardened(i) => *i,
        }
    }

    /// Raw value fed to child derivation (offset included when hardened).
    pub const fn to_u32(&self) -> u32 {
        match self {
            Self::Normal(i) => *i,
            Self::Hardened(i) => *i | HARDENED_OFFSET,
        }
    }
}

impl From<u32> for ChildIndex {
    fn from(raw: u32) -> Self {
        if raw >= HARDENED_OFFSET {
            Self::Hardened(raw & !HARDENED_OFFSET)
        } else {
            Self::Normal(raw)
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(i) => write!(f, "{}", i),
            Self::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

impl FromStr for ChildIndex {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_suffix(['\'', 'h', 'H']) {
            Some(index) => Self::hardened(index.parse()?),
            None => Self::normal(s.parse()?),
        }
    }
}

/// Role of a chain below the account key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chain {
    /// Receiving addresses
    External,
    /// Change addresses
    Internal,
    /// Staking key branch ("chimeric account")
    Staking,
}

impl Chain {
    pub const fn as_u32(&self) -> u32 {
        match self {
            Chain::External => 0,
            Chain::Internal => 1,
            Chain::Staking => 2,
        }
    }

    /// Whether payment addresses are built from this chain.
    pub const fn is_payment(&self) -> bool {
        matches!(self, Chain::External | Chain::Internal)
    }
}

impl TryFrom<u32> for Chain {
    type Error = TypesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Chain::External),
            1 => Ok(Chain::Internal),
            2 => Ok(Chain::Staking),
            other => Err(TypesError::InvalidChain(other)),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::External => write!(f, "external"),
            Chain::Internal => write!(f, "internal"),
            Chain::Staking => write!(f, "staking"),
        }
    }
}

/// Ordered sequence of child indices from the root key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<ChildIndex>,
}

impl DerivationPath {
    /// Empty path (the root key itself).
    pub fn master() -> Self {
        Self::default()
    }

    pub fn new(indices: Vec<ChildIndex>) -> Self {
        Self { indices }
    }

    /// `m/1852'/1815'/account'`
    pub fn account(account: u32) -> Result<Self, TypesError> {
        Ok(Self::new(vec![
            ChildIndex::Hardened(PURPOSE),
            ChildIndex::Hardened(COIN_TYPE),
            ChildIndex::hardened(account)?,
        ]))
    }

    /// `m/1852'/1815'/account'/chain/index`
    pub fn cip1852(account: u32, chain: Chain, index: u32) -> Result<Self, TypesError> {
        let mut path = Self::account(account)?;
        path.push(ChildIndex::Normal(chain.as_u32()));
        path.push(ChildIndex::normal(index)?);
        Ok(path)
    }

    pub fn push(&mut self, index: ChildIndex) {
        self.indices.push(index);
    }

    /// New path with `index` appended.
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut path = self.clone();
        path.push(index);
        path
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildIndex> {
        self.indices.iter()
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn is_master(&self) -> bool {
        self.indices.is_empty()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('/');

        match parts.next() {
            Some("m") | Some("M") => {}
            _ => return Err(TypesError::InvalidDerivationPath(s.to_string())),
        }

        let indices = parts
            .map(|part| {
                if part.is_empty() {
                    return Err(TypesError::InvalidDerivationPath(s.to_string()));
                }
                part.parse::<ChildIndex>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { indices })
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildIndex;
    type IntoIter = std::slice::Iter<'a, ChildIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harden() {
        assert_eq!(harden(0).unwrap(), 0x8000_0000);
        assert_eq!(harden(1852).unwrap(), 0x8000_073c);
        assert_eq!(harden(0x8000_0000), Err(TypesError::IndexOutOfRange(0x8000_0000)));
    }

    #[test]
    fn test_child_index_raw() {
        assert_eq!(ChildIndex::Hardened(1815).to_u32(), 1815 | HARDENED_OFFSET);
        assert_eq!(ChildIndex::Normal(2).to_u32(), 2);
        assert_eq!(ChildIndex::from(HARDENED_OFFSET + 5), ChildIndex::Hardened(5));
        assert!(ChildIndex::normal(HARDENED_OFFSET).is_err());
        assert!(ChildIndex::hardened(HARDENED_OFFSET).is_err());
    }

    #[test]
    fn test_child_index_parse() {
        assert_eq!("44'".parse::<ChildIndex>().unwrap(), ChildIndex::Hardened(44));
        assert_eq!("44h".parse::<ChildIndex>().unwrap(), ChildIndex::Hardened(44));
        assert_eq!("7".parse::<ChildIndex>().unwrap(), ChildIndex::Normal(7));
        assert!("x".parse::<ChildIndex>().is_err());
        assert!("2147483648".parse::<ChildIndex>().is_err());
    }

    #[test]
    fn test_cip1852_path() {
        let path = DerivationPath::cip1852(0, Chain::External, 0).unwrap();
        assert_eq!(path.to_string(), "m/1852'/1815'/0'/0/0");
        assert_eq!(path.depth(), 5);

        let stake = DerivationPath::cip1852(3, Chain::Staking, 0).unwrap();
        assert_eq!(stake.to_string(), "m/1852'/1815'/3'/2/0");
    }

    #[test]
    fn test_path_parse_roundtrip() {
        let path: DerivationPath = "m/1852'/1815'/0'/1/12".parse().unwrap();
        assert_eq!(path, DerivationPath::cip1852(0, Chain::Internal, 12).unwrap());
        assert_eq!(path.to_string(), "m/1852'/1815'/0'/1/12");

        let master: DerivationPath = "m".parse().unwrap();
        assert!(master.is_master());
    }

    #[test]
    fn test_path_parse_invalid() {
        assert!("1852'/1815'".parse::<DerivationPath>().is_err());
        assert!("m//0".parse::<DerivationPath>().is_err());
        assert!("m/abc".parse::<DerivationPath>().is_err());
        assert!("".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn test_chain_conversion() {
        assert_eq!(Chain::try_from(1).unwrap(), Chain::Internal);
        assert_eq!(Chain::try_from(3), Err(TypesError::InvalidChain(3)));
        assert!(Chain::External.is_payment());
        assert!(!Chain::Staking.is_payment());
    }
}
