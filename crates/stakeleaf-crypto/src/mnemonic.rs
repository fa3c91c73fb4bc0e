//! Recovery phrases and the entropy they encode (BIP-39, English word list).

use crate::error::CryptoError;
use crate::provider::{self, Provider};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Entropy sizes accepted by [`Mnemonics::generate`], in bits.
pub const SUPPORTED_STRENGTHS: [usize; 5] = [128, 160, 192, 224, 256];

/// Strength used when the caller has no preference (15 words).
pub const DEFAULT_STRENGTH: usize = 160;

/// Word count for a given strength.
pub fn word_count(strength_bits: usize) -> Option<usize> {
    SUPPORTED_STRENGTHS
        .contains(&strength_bits)
        .then(|| (strength_bits + strength_bits / 32) / 11)
}

/// Strength for a given word count.
pub fn strength_for_words(words: usize) -> Option<usize> {
    SUPPORTED_STRENGTHS
        .iter()
        .copied()
        .find(|bits| word_count(*bits) == Some(words))
}

/// Raw mnemonic entropy (16 to 32 bytes). Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entropy(Vec<u8>);

impl Entropy {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bits = bytes.len() * 8;
        if !SUPPORTED_STRENGTHS.contains(&bits) {
            return Err(CryptoError::InvalidStrength(bits));
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bits(&self) -> usize {
        self.0.len() * 8
    }
}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entropy({} bits)", self.bits())
    }
}

/// A checksum-valid recovery phrase, normalized to lowercase words separated by
/// single spaces. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MnemonicPhrase(String);

impl MnemonicPhrase {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// Build the phrase for `entropy` with the global provider.
    pub fn from_entropy(entropy: &Entropy) -> Result<Self, CryptoError> {
        Mnemonics::global().from_entropy(entropy)
    }
}

impl fmt::Debug for MnemonicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MnemonicPhrase({} words)", self.word_count())
    }
}

impl std::str::FromStr for MnemonicPhrase {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mnemonics::global().parse(s)
    }
}

/// Lowercase words joined by single spaces, built in a buffer wiped on drop.
fn normalize(phrase: &str) -> Zeroizing<String> {
    let mut normalized = Zeroizing::new(String::with_capacity(phrase.len()));
    for word in phrase.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.extend(word.chars().flat_map(char::to_lowercase));
    }
    normalized
}

/// Mnemonic generation and validation over an injected primitives provider.
#[derive(Clone)]
pub struct Mnemonics {
    provider: Provider,
}

impl Mnemonics {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    pub fn global() -> Self {
        Self::new(provider::global())
    }

    /// Fresh phrase with `strength_bits` of random entropy.
    pub fn generate(&self, strength_bits: usize) -> Result<MnemonicPhrase, CryptoError> {
        if !SUPPORTED_STRENGTHS.contains(&strength_bits) {
            return Err(CryptoError::InvalidStrength(strength_bits));
        }

        let mut bytes = zeroize::Zeroizing::new(vec![0u8; strength_bits / 8]);
        self.provider.fill_random(&mut bytes)?;
        let entropy = Entropy::from_slice(&bytes)?;

        tracing::debug!(strength_bits, "Generated mnemonic entropy");
        self.from_entropy(&entropy)
    }

    /// Whether `phrase` has a valid word count, known words and a matching checksum.
    /// Never fails; malformed input is simply invalid.
    pub fn validate(&self, phrase: &str) -> bool {
        self.provider.mnemonic_to_entropy(&normalize(phrase)).is_ok()
    }

    /// Entropy encoded by `phrase`. Fails with `InvalidMnemonic` when it does not validate.
    pub fn to_entropy(&self, phrase: &str) -> Result<Entropy, CryptoError> {
        let bytes = self
            .provider
            .mnemonic_to_entropy(&normalize(phrase))
            .map_err(|_| CryptoError::InvalidMnemonic)?;
        Entropy::from_slice(&bytes).map_err(|_| CryptoError::InvalidMnemonic)
    }

    /// Validate and normalize user input.
    pub fn parse(&self, phrase: &str) -> Result<MnemonicPhrase, CryptoError> {
        let mut normalized = normalize(phrase);
        self.provider
            .mnemonic_to_entropy(&normalized)
            .map_err(|_| CryptoError::InvalidMnemonic)?;
        Ok(MnemonicPhrase(std::mem::take(&mut *normalized)))
    }

    /// Inverse of [`Mnemonics::to_entropy`].
    pub fn from_entropy(&self, entropy: &Entropy) -> Result<MnemonicPhrase, CryptoError> {
        let phrase = self.provider.entropy_to_mnemonic(entropy.as_bytes())?;
        Ok(MnemonicPhrase(phrase))
    }
}

impl Default for Mnemonics {
    fn default() -> Self {
        Self::global()
    }
}

/// Generate a phrase with the global provider.
pub fn generate(strength_bits: usize) -> Result<MnemonicPhrase, CryptoError> {
    Mnemonics::global().generate(strength_bits)
}

/// Validate a phrase with the global provider.
pub fn validate(phrase: &str) -> bool {
    Mnemonics::global().validate(phrase)
}

/// Decode a phrase to entropy with the global provider.
pub fn to_entropy(phrase: &str) -> Result<Entropy, CryptoError> {
    Mnemonics::global().to_entropy(phrase)
}
