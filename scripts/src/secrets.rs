//! Loading of the mnemonic and API keys for a network family

use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
    fs,
    path::Path,
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    errors::DeployError,
    networks::{ApiKeyKind, NetworkProfile},
};

/// The word counts a BIP-39 mnemonic may have
const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// The on-disk layout of a secrets file
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SecretsFile {
    /// The deployer's mnemonic phrase
    mnemonic: String,
    /// The Infura API key
    infura_api_key: Option<String>,
    /// The Etherscan API key
    etherscan_api_key: Option<String>,
    /// The Polygonscan API key
    polygonscan_api_key: Option<String>,
}

/// The secrets of a network family
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBundle {
    /// The deployer's mnemonic phrase
    mnemonic: String,
    /// The API keys present in the secrets file
    api_keys: BTreeMap<ApiKeyKind, String>,
}

impl Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("mnemonic", &"<redacted>")
            .field("api_keys", &self.api_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SecretBundle {
    /// Create a bundle from an already validated mnemonic and key set
    pub fn new(mnemonic: String, api_keys: BTreeMap<ApiKeyKind, String>) -> Self {
        Self { mnemonic, api_keys }
    }

    /// Load the secrets file of the given network from `secrets_dir`
    pub fn load_for(profile: &NetworkProfile, secrets_dir: &Path) -> Result<Self, DeployError> {
        Self::load(&secrets_dir.join(profile.secrets_file))
    }

    /// Load and validate a secrets file
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        debug!("reading secrets from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            DeployError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_json(&contents)
            .map_err(|e| DeployError::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Parse and validate the contents of a secrets file
    pub fn from_json(contents: &str) -> Result<Self, DeployError> {
        let file: SecretsFile = serde_json::from_str(contents)
            .map_err(|e| DeployError::Configuration(e.to_string()))?;

        let mnemonic = file.mnemonic.split_whitespace().collect::<Vec<_>>().join(" ");
        let word_count = mnemonic.split(' ').filter(|w| !w.is_empty()).count();
        if !MNEMONIC_WORD_COUNTS.contains(&word_count) {
            return Err(DeployError::Configuration(format!(
                "mnemonic must have 12, 15, 18, 21 or 24 words, found {}",
                word_count
            )));
        }

        let api_keys = [
            (ApiKeyKind::Infura, file.infura_api_key),
            (ApiKeyKind::Etherscan, file.etherscan_api_key),
            (ApiKeyKind::Polygonscan, file.polygonscan_api_key),
        ]
        .into_iter()
        .filter_map(|(kind, key)| Some((kind, key?)))
        .filter(|(_, key)| !key.trim().is_empty())
        .collect();

        Ok(Self { mnemonic, api_keys })
    }

    /// The deployer's mnemonic phrase
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// The API key for the given service, if present
    pub fn api_key(&self, kind: ApiKeyKind) -> Option<&str> {
        self.api_keys.get(&kind).map(String::as_str)
    }
}
