//! Sequential execution of deployments against a single network

use std::{path::Path, time::Duration};

use alloy::primitives::{Address, Bytes, TxHash};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    artifacts::ArtifactStore,
    constants::DEFAULT_POLL_INTERVAL,
    errors::{DeployError, MigrationFailure},
    networks::{NetworkProfile, NetworkRegistry},
    secrets::SecretBundle,
    specs::DeploymentSpec,
    transport::{ProviderFactory, SigningTransport},
    utils::write_deployment,
};

/// The outcome of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    /// The deployed contract
    pub contract_name: String,
    /// The network it was deployed to
    pub network: String,
    /// The address of the deployed contract
    pub address: Address,
    /// The hash of the creation transaction
    pub transaction_hash: TxHash,
    /// The block the creation transaction was included in
    pub block_number: u64,
    /// The number of confirmations observed before the result was recorded
    pub confirmations: u64,
}

/// A deployment whose arguments have been checked against the contract ABI
#[derive(Debug, Clone)]
pub struct PreparedDeployment {
    /// The spec the deployment was built from
    pub spec: DeploymentSpec,
    /// The creation code: bytecode followed by the encoded constructor arguments
    pub code: Bytes,
}

/// Load the artifact of every spec and encode its constructor arguments.
///
/// Runs before anything is submitted, so a bad artifact or argument list
/// anywhere in the sequence aborts the run without touching the chain.
pub fn prepare_deployments(
    specs: &[DeploymentSpec],
    artifacts: &ArtifactStore,
) -> Result<Vec<PreparedDeployment>, DeployError> {
    specs
        .iter()
        .map(|spec| {
            let artifact = artifacts.load(&spec.contract_name)?;
            let code = artifact.deployment_code(spec)?;
            Ok(PreparedDeployment {
                spec: spec.clone(),
                code,
            })
        })
        .collect()
}

/// Everything a migration run needs: the resolved profile, its secrets, and
/// the transport, built the first time a deployment needs it
pub struct RunContext<F: ProviderFactory> {
    /// The network being deployed to
    profile: NetworkProfile,
    /// The secrets of the network family
    secrets: SecretBundle,
    /// Builds the transport on first use
    factory: F,
    /// The memoized transport
    transport: Option<F::Transport>,
    /// The interval between confirmation polls
    poll_interval: Duration,
    /// The ledger successful deployments are appended to
    deployments_path: Option<String>,
}

impl<F: ProviderFactory> RunContext<F> {
    /// Create a context for an already resolved profile
    pub fn new(profile: NetworkProfile, secrets: SecretBundle, factory: F) -> Self {
        Self {
            profile,
            secrets,
            factory,
            transport: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            deployments_path: None,
        }
    }

    /// Resolve `network` and load its secrets from `secrets_dir`
    pub fn for_network(
        registry: &NetworkRegistry,
        network: &str,
        secrets_dir: &Path,
        factory: F,
    ) -> Result<Self, DeployError> {
        let profile = registry.resolve(network)?.clone();
        let secrets = SecretBundle::load_for(&profile, secrets_dir)?;
        Ok(Self::new(profile, secrets, factory))
    }

    /// Set the interval between confirmation polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Record successful deployments in the given `deployments.json`
    pub fn with_deployments_path(mut self, path: impl Into<String>) -> Self {
        self.deployments_path = Some(path.into());
        self
    }

    /// The network being deployed to
    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    /// The secrets of the network family
    pub fn secrets(&self) -> &SecretBundle {
        &self.secrets
    }

    /// Whether the transport has been built yet
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Get the transport, building it on first use
    pub async fn transport(&mut self) -> Result<&F::Transport, DeployError> {
        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => self.connect().await?,
        };

        Ok(self.transport.insert(transport))
    }

    /// Build the transport and report the deployer account
    async fn connect(&self) -> Result<F::Transport, DeployError> {
        info!("connecting to {}", self.profile.name);
        let transport = self
            .factory
            .create_provider(&self.profile, &self.secrets)
            .await?;

        let deployer = transport.deployer();
        println!("Deploying contracts with the account: {:#x}", deployer);
        match transport.balance().await {
            Ok(balance) => println!("Account balance: {}", balance),
            Err(e) => warn!("could not fetch deployer balance: {}", e),
        }

        Ok(transport)
    }

    /// Deploy each contract in order, stopping at the first failure.
    ///
    /// Deployments are never retried or rolled back. On failure the results of
    /// the deployments that already went through are returned in the error.
    pub async fn run(
        &mut self,
        deployments: Vec<PreparedDeployment>,
    ) -> Result<Vec<DeploymentResult>, MigrationFailure> {
        let mut results = Vec::with_capacity(deployments.len());
        info!(
            "running {} deployment(s) on {}: {}",
            deployments.len(),
            self.profile.name,
            deployments.iter().map(|d| &d.spec.contract_name).join(", ")
        );

        for deployment in deployments {
            let contract_name = deployment.spec.contract_name.clone();
            match self.deploy(deployment).await {
                Ok(result) => {
                    println!("{} deployed at {:#x}", result.contract_name, result.address);
                    let recorded = self.record(&result);
                    results.push(result);
                    if let Err(error) = recorded {
                        return Err(MigrationFailure {
                            completed: results,
                            failed_contract: contract_name,
                            error,
                        });
                    }
                }
                Err(error) => {
                    return Err(MigrationFailure {
                        completed: results,
                        failed_contract: contract_name,
                        error,
                    });
                }
            }
        }

        Ok(results)
    }

    /// Submit a single deployment and wait for it to be confirmed
    async fn deploy(
        &mut self,
        deployment: PreparedDeployment,
    ) -> Result<DeploymentResult, DeployError> {
        let PreparedDeployment { spec, code } = deployment;
        let skip_dry_run = self.profile.skip_dry_run;
        let network = self.profile.name.to_string();
        let confirmations = self.profile.confirmations;
        let block_timeout = self.profile.block_timeout;
        let poll_interval = self.poll_interval;

        info!(
            "deploying {}@{} with ({})",
            spec.contract_name,
            spec.version,
            spec.constructor_args.iter().join(", ")
        );

        let transport = self.transport().await?;
        if skip_dry_run {
            debug!("skipping dry run of {}", spec.contract_name);
        } else {
            transport.simulate_deployment(&code).await?;
        }

        let submitted_at = transport.block_number().await?;
        let tx_hash = transport.submit_deployment(code).await?;
        info!("{} submitted in {:#x}", spec.contract_name, tx_hash);

        let (receipt, observed) = loop {
            let head = transport.block_number().await?;
            if let Some(receipt) = transport.receipt(tx_hash).await? {
                if !receipt.success {
                    return Err(DeployError::Transaction(format!(
                        "{} deployment reverted in {:#x}",
                        spec.contract_name, tx_hash
                    )));
                }

                let observed = confirmations_at(head, receipt.block_number);
                if observed >= confirmations {
                    break (receipt, observed);
                }
                debug!(
                    "{}: {}/{} confirmations",
                    spec.contract_name, observed, confirmations
                );
            }

            if head.saturating_sub(submitted_at) > block_timeout {
                return Err(DeployError::Transaction(format!(
                    "{} not confirmed within {} blocks of submission ({:#x})",
                    spec.contract_name, block_timeout, tx_hash
                )));
            }

            tokio::time::sleep(poll_interval).await;
        };

        let address = receipt.contract_address.ok_or_else(|| {
            DeployError::Transaction(format!(
                "receipt of {:#x} has no contract address",
                tx_hash
            ))
        })?;

        Ok(DeploymentResult {
            contract_name: spec.contract_name,
            network,
            address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            confirmations: observed,
        })
    }

    /// Append a result to the deployments file, if one is configured
    fn record(&self, result: &DeploymentResult) -> Result<(), DeployError> {
        match &self.deployments_path {
            Some(path) => write_deployment(path, result),
            None => Ok(()),
        }
    }
}

/// The number of confirmations a transaction mined in `mined_at` has at `head`
fn confirmations_at(head: u64, mined_at: u64) -> u64 {
    if head < mined_at {
        0
    } else {
        head - mined_at + 1
    }
}

#[cfg(test)]
mod tests {
    use super::confirmations_at;

    #[test]
    fn test_confirmations_at() {
        assert_eq!(confirmations_at(10, 10), 1);
        assert_eq!(confirmations_at(11, 10), 2);
        assert_eq!(confirmations_at(9, 10), 0);
    }
}
