//! Serde implementations for stakeleaf-types.
//!
//! Addresses, key hashes and paths serialize as text; network ids as their number.

#[cfg(feature = "serde")]
mod serde_impls {
    use crate::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    // Address
    impl Serialize for Address {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let text = self.to_bech32().map_err(serde::ser::Error::custom)?;
            text.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Address::from_str(&s).map_err(serde::de::Error::custom)
        }
    }

    // KeyHash
    impl Serialize for KeyHash {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            self.to_hex().serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for KeyHash {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            KeyHash::from_str(&s).map_err(serde::de::Error::custom)
        }
    }

    // NetworkId
    impl Serialize for NetworkId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            self.as_u8().serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for NetworkId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let id = u8::deserialize(deserializer)?;
            NetworkId::new(id).map_err(serde::de::Error::custom)
        }
    }

    // DerivationPath
    impl Serialize for DerivationPath {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            self.to_string().serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for DerivationPath {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            DerivationPath::from_str(&s).map_err(serde::de::Error::custom)
        }
    }
}
