//! Bech32 text codec (BIP-173 checksum, no length cap beyond the checksum's code length).

use crate::error::TypesError;
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

/// Encode `payload` under the human-readable prefix `hrp`.
pub fn encode(hrp: &str, payload: &[u8]) -> Result<String, TypesError> {
    let hrp = Hrp::parse(hrp).map_err(|e| TypesError::Bech32Error(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, payload).map_err(|e| TypesError::Bech32Error(e.to_string()))
}

/// Decode bech32 text, verifying the checksum. Returns the lowercase prefix and the payload.
///
/// Bech32m strings are rejected.
pub fn decode(text: &str) -> Result<(String, Vec<u8>), TypesError> {
    let checked = CheckedHrpstring::new::<Bech32>(text)
        .map_err(|e| TypesError::Bech32Error(e.to_string()))?;
    let hrp = checked.hrp().as_str().to_ascii_lowercase();
    Ok((hrp, checked.byte_iter().collect()))
}
