//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::runner::DeploymentResult;

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// The requested network is not in the registry
    UnknownNetwork(String),
    /// Missing or malformed configuration (secrets, parameter tables, literals)
    Configuration(String),
    /// Error reading or parsing a contract build artifact
    ArtifactParsing(String),
    /// The constructor arguments do not match the contract's declared constructor
    ArgumentMismatch(String),
    /// Error initializing the signing transport
    ProviderInitialization(String),
    /// Error submitting or confirming a deployment transaction
    Transaction(String),
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
    /// Error verifying a contract on a block explorer
    Verification(String),
}

impl Display for DeployError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::UnknownNetwork(s) => write!(f, "unknown network: {}", s),
            DeployError::Configuration(s) => write!(f, "configuration error: {}", s),
            DeployError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            DeployError::ArgumentMismatch(s) => {
                write!(f, "constructor argument mismatch: {}", s)
            }
            DeployError::ProviderInitialization(s) => {
                write!(f, "error initializing provider: {}", s)
            }
            DeployError::Transaction(s) => write!(f, "transaction error: {}", s),
            DeployError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            DeployError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            DeployError::Verification(s) => write!(f, "error verifying contract: {}", s),
        }
    }
}

impl Error for DeployError {}

/// A migration run that aborted part-way through.
///
/// Deployments that completed before the failure are already on-chain and
/// are kept here so the operator can resume from the failed step.
#[derive(Debug)]
pub struct MigrationFailure {
    /// Results of the deployments that completed before the failure, in order
    pub completed: Vec<DeploymentResult>,
    /// The contract whose deployment failed
    pub failed_contract: String,
    /// The underlying error
    pub error: DeployError,
}

impl Display for MigrationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deployment of {} failed after {} completed deployment(s): {}",
            self.failed_contract,
            self.completed.len(),
            self.error
        )
    }
}

impl Error for MigrationFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl From<MigrationFailure> for DeployError {
    fn from(failure: MigrationFailure) -> Self {
        failure.error
    }
}
