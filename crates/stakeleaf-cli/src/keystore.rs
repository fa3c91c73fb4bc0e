//! Keystore directory for encrypted wallets.
//!
//! Each wallet is one envelope file, `<name>.json`, holding the root key
//! under Argon2id + AES-256-GCM. The file name is the only index.

use stakeleaf_crypto::EncryptedKeyEnvelope;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Listing entry for a stored wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreEntry {
    /// Wallet name (file stem)
    pub name: String,
    /// Envelope id
    pub id: String,
    /// Envelope file
    pub path: PathBuf,
}

/// Directory of envelope files.
#[derive(Debug)]
pub struct Keystore {
    dir: PathBuf,
}

impl Keystore {
    /// Open the keystore at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds wallet `name`.
    pub fn wallet_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{}.{}", name, EXTENSION)))
    }

    pub fn has_wallet(&self, name: &str) -> bool {
        self.wallet_path(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Store a new wallet. Existing files are never overwritten.
    pub fn save_wallet(
        &self,
        name: &str,
        envelope: &EncryptedKeyEnvelope,
    ) -> anyhow::Result<PathBuf> {
        let path = self.wallet_path(name)?;
        if path.exists() {
            anyhow::bail!("Wallet '{}' already exists at {}", name, path.display());
        }

        envelope.save(&path)?;
        tracing::debug!(wallet = name, path = %path.display(), "Saved envelope");
        Ok(path)
    }

    /// Read the envelope for wallet `name`.
    pub fn load_wallet(&self, name: &str) -> anyhow::Result<EncryptedKeyEnvelope> {
        let path = self.wallet_path(name)?;
        if !path.exists() {
            anyhow::bail!("Wallet not found: {}", name);
        }
        Ok(EncryptedKeyEnvelope::load(&path)?)
    }

    /// All readable envelopes, sorted by name. Unreadable files are skipped.
    pub fn list_wallets(&self) -> anyhow::Result<Vec<KeystoreEntry>> {
        let mut entries = Vec::new();

        for item in fs::read_dir(&self.dir)? {
            let path = item?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match EncryptedKeyEnvelope::load(&path) {
                Ok(envelope) => entries.push(KeystoreEntry {
                    name: name.to_string(),
                    id: envelope.id,
                    path: path.clone(),
                }),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable keystore file"
                    );
                }
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// Names become file stems: ASCII letters, digits, `-` and `_` only.
fn validate_name(name: &str) -> anyhow::Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        anyhow::bail!(
            "Invalid wallet name '{}': use 1-64 letters, digits, '-' or '_'",
            name
        );
    }
    Ok(())
}
