//! The registry of networks the contracts can be deployed to

use std::fmt::{self, Display};

use crate::{constants::INFURA_API_KEY_PLACEHOLDER, errors::DeployError, secrets::SecretBundle};

/// The third-party services an API key can be held for
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiKeyKind {
    /// Infura RPC access
    Infura,
    /// Etherscan contract verification
    Etherscan,
    /// Polygonscan contract verification
    Polygonscan,
}

impl ApiKeyKind {
    /// The field holding this key in a secrets file
    pub fn field_name(&self) -> &'static str {
        match self {
            ApiKeyKind::Infura => "infura_api_key",
            ApiKeyKind::Etherscan => "etherscan_api_key",
            ApiKeyKind::Polygonscan => "polygonscan_api_key",
        }
    }
}

impl Display for ApiKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// The connection parameters of a network
///
/// Profiles never hold secrets; the mnemonic is handed to the provider
/// factory separately and API keys are only spliced in by [`NetworkProfile::rpc_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The name the network is selected by
    pub name: &'static str,
    /// The RPC URL, possibly containing an API key placeholder
    pub rpc_url_template: &'static str,
    /// The EIP-155 chain ID
    pub chain_id: u64,
    /// The number of blocks a deployment must be buried under
    pub confirmations: u64,
    /// The number of blocks to wait for a deployment before giving up
    pub block_timeout: u64,
    /// Whether to skip the pre-flight simulation of each deployment
    pub skip_dry_run: bool,
    /// The secrets file of the network family, relative to the secrets directory
    pub secrets_file: &'static str,
    /// The Etherscan-compatible explorer API used for verification
    pub explorer_api_url: Option<&'static str>,
    /// The API key the explorer expects
    pub explorer_api_key: Option<ApiKeyKind>,
}

impl NetworkProfile {
    /// The RPC URL of the network with any API key placeholders filled in
    pub fn rpc_url(&self, secrets: &SecretBundle) -> Result<String, DeployError> {
        let mut url = self.rpc_url_template.to_string();
        if url.contains(INFURA_API_KEY_PLACEHOLDER) {
            let key = secrets.api_key(ApiKeyKind::Infura).ok_or_else(|| {
                DeployError::Configuration(format!(
                    "network {} requires `{}` in {}",
                    self.name,
                    ApiKeyKind::Infura,
                    self.secrets_file
                ))
            })?;
            url = url.replace(INFURA_API_KEY_PLACEHOLDER, key);
        }

        Ok(url)
    }
}

/// The networks known to the scripts
pub const NETWORKS: [NetworkProfile; 4] = [
    NetworkProfile {
        name: "mumbai",
        rpc_url_template: "https://rpc-mumbai.maticvigil.com",
        chain_id: 80001,
        confirmations: 2,
        block_timeout: 5000,
        skip_dry_run: true,
        secrets_file: "secret.mumbai.json",
        explorer_api_url: Some("https://api-testnet.polygonscan.com/api"),
        explorer_api_key: Some(ApiKeyKind::Polygonscan),
    },
    NetworkProfile {
        name: "matic",
        rpc_url_template: "https://rpc-mainnet.maticvigil.com",
        chain_id: 137,
        confirmations: 2,
        block_timeout: 5000,
        skip_dry_run: true,
        secrets_file: "secret.mumbai.json",
        explorer_api_url: Some("https://api.polygonscan.com/api"),
        explorer_api_key: Some(ApiKeyKind::Polygonscan),
    },
    NetworkProfile {
        name: "kovan",
        rpc_url_template: "https://kovan.infura.io/v3/{infura_api_key}",
        chain_id: 42,
        confirmations: 2,
        block_timeout: 200,
        skip_dry_run: true,
        secrets_file: "secret.ethereum.json",
        explorer_api_url: Some("https://api-kovan.etherscan.io/api"),
        explorer_api_key: Some(ApiKeyKind::Etherscan),
    },
    NetworkProfile {
        name: "rinkeby",
        rpc_url_template: "https://rinkeby.infura.io/v3/{infura_api_key}",
        chain_id: 4,
        confirmations: 2,
        block_timeout: 200,
        skip_dry_run: true,
        secrets_file: "secret.ethereum.json",
        explorer_api_url: Some("https://api-rinkeby.etherscan.io/api"),
        explorer_api_key: Some(ApiKeyKind::Etherscan),
    },
];

/// A lookup table of network profiles keyed by name
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    /// The registered profiles
    profiles: Vec<NetworkProfile>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self {
            profiles: NETWORKS.to_vec(),
        }
    }
}

impl NetworkRegistry {
    /// Build a registry from the given profiles, rejecting duplicate names
    pub fn new(profiles: Vec<NetworkProfile>) -> Result<Self, DeployError> {
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(DeployError::Configuration(format!(
                    "network {} registered twice",
                    profile.name
                )));
            }
        }

        Ok(Self { profiles })
    }

    /// Look up the profile of the given network
    pub fn resolve(&self, name: &str) -> Result<&NetworkProfile, DeployError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| DeployError::UnknownNetwork(name.to_string()))
    }

    /// All registered profiles, in registration order
    pub fn profiles(&self) -> &[NetworkProfile] {
        &self.profiles
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{ApiKeyKind, NetworkRegistry, NETWORKS};
    use crate::{errors::DeployError, secrets::SecretBundle};

    const TEST_MNEMONIC: &str =
        "test test test test test test test test test test test junk";

    fn full_bundle() -> SecretBundle {
        let api_keys = BTreeMap::from([
            (ApiKeyKind::Infura, "infura-key".to_string()),
            (ApiKeyKind::Etherscan, "etherscan-key".to_string()),
            (ApiKeyKind::Polygonscan, "polygonscan-key".to_string()),
        ]);
        SecretBundle::new(TEST_MNEMONIC.to_string(), api_keys)
    }

    #[test]
    fn test_all_networks_resolve() {
        let registry = NetworkRegistry::default();
        let secrets = full_bundle();

        for profile in NETWORKS.iter() {
            let resolved = registry.resolve(profile.name).unwrap();
            assert!(resolved.confirmations >= 1);

            let url = resolved.rpc_url(&secrets).unwrap();
            assert!(!url.is_empty());
            assert!(!url.contains('{'));
        }
    }

    #[test]
    fn test_unknown_network() {
        let registry = NetworkRegistry::default();
        assert_eq!(
            registry.resolve("ropsten").unwrap_err(),
            DeployError::UnknownNetwork("ropsten".to_string())
        );
    }

    #[test]
    fn test_mumbai_profile() {
        let registry = NetworkRegistry::default();
        let mumbai = registry.resolve("mumbai").unwrap();

        assert_eq!(mumbai.chain_id, 80001);
        assert_eq!(mumbai.confirmations, 2);
        assert_eq!(mumbai.block_timeout, 5000);
        assert!(mumbai.skip_dry_run);
        assert_eq!(
            mumbai.rpc_url(&full_bundle()).unwrap(),
            "https://rpc-mumbai.maticvigil.com"
        );
    }

    #[test]
    fn test_infura_key_interpolated() {
        let registry = NetworkRegistry::default();
        let kovan = registry.resolve("kovan").unwrap();

        let url = kovan.rpc_url(&full_bundle()).unwrap();
        assert_eq!(url, "https://kovan.infura.io/v3/infura-key");
        assert!(!url.contains(TEST_MNEMONIC));
    }

    #[test]
    fn test_missing_infura_key() {
        let registry = NetworkRegistry::default();
        let rinkeby = registry.resolve("rinkeby").unwrap();
        let secrets = SecretBundle::new(TEST_MNEMONIC.to_string(), BTreeMap::new());

        assert!(matches!(
            rinkeby.rpc_url(&secrets),
            Err(DeployError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let profiles = vec![NETWORKS[0].clone(), NETWORKS[0].clone()];
        assert!(NetworkRegistry::new(profiles).is_err());
    }
}
