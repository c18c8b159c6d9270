//! Definitions of CLI arguments and commands for deploy scripts

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy, list_networks, migrate, verify},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_COMPILER_VERSION, DEFAULT_DEPLOYMENTS_PATH,
        DEFAULT_POLL_INTERVAL,
    },
    errors::DeployError,
    transport::AlloyProviderFactory,
};

/// Deploy the NiftyRoyale contracts
#[derive(Parser)]
pub struct Cli {
    /// The network to deploy to, e.g. `mumbai`
    #[arg(short, long, env = "NETWORK")]
    pub network: Option<String>,

    /// Directory holding the `secret.*.json` files
    #[arg(long, default_value = ".")]
    pub secrets_dir: PathBuf,

    /// Directory holding the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Path to the file in which deployments are recorded
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The paths and network shared by every command
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The network to deploy to, required by every command but `networks`
    pub network: Option<String>,
    /// Directory holding the secrets files
    pub secrets_dir: PathBuf,
    /// Directory holding the contract artifacts
    pub artifacts_dir: PathBuf,
    /// Path to the deployments file
    pub deployments_path: String,
    /// The interval between confirmation polls
    pub poll_interval: Duration,
}

impl RunOptions {
    /// Options with the default poll interval
    pub fn new(
        network: Option<String>,
        secrets_dir: PathBuf,
        artifacts_dir: PathBuf,
        deployments_path: String,
    ) -> Self {
        Self {
            network,
            secrets_dir,
            artifacts_dir,
            deployments_path,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// The selected network
    pub fn network(&self) -> Result<&str, DeployError> {
        self.network.as_deref().ok_or_else(|| {
            DeployError::Configuration(
                "no network selected, pass --network or set NETWORK".to_string(),
            )
        })
    }
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Run the numbered migration plan
    Migrate(MigrateArgs),
    /// Deploy a single contract
    Deploy(DeployArgs),
    /// Verify a deployed contract on the network's block explorer
    Verify(VerifyArgs),
    /// List the known networks
    Networks,
}

impl Command {
    /// Run the command
    pub async fn run(self, options: RunOptions) -> Result<(), DeployError> {
        match self {
            Command::Migrate(args) => {
                migrate(args, &options, AlloyProviderFactory).await?;
                Ok(())
            }
            Command::Deploy(args) => {
                deploy(args, &options, AlloyProviderFactory).await?;
                Ok(())
            }
            Command::Verify(args) => verify(args, &options).await,
            Command::Networks => list_networks(),
        }
    }
}

/// Run the migration plan, or a slice of it
#[derive(Args)]
pub struct MigrateArgs {
    /// The first migration to run
    #[arg(long)]
    pub from: Option<u32>,

    /// The last migration to run
    #[arg(long)]
    pub to: Option<u32>,

    /// JSON file overriding the default collection parameters
    #[arg(long)]
    pub params: Option<PathBuf>,
}

/// Deploy a single contract outside of the migration plan
#[derive(Args)]
pub struct DeployArgs {
    /// The contract to deploy, e.g. `BattleRoyale`
    #[arg(short, long)]
    pub contract: String,

    /// The constructor interface version, latest if omitted
    #[arg(short, long)]
    pub version: Option<u32>,

    /// JSON file overriding the default collection parameters
    #[arg(long)]
    pub params: Option<PathBuf>,
}

/// Verify the source of a recorded deployment
#[derive(Args)]
pub struct VerifyArgs {
    /// The deployed contract, e.g. `BattleRoyale`
    #[arg(short, long)]
    pub contract: String,

    /// The constructor interface version it was deployed with, latest if omitted
    #[arg(short, long)]
    pub version: Option<u32>,

    /// JSON file overriding the default collection parameters
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// The solc standard-json input the contract was compiled from
    #[arg(long)]
    pub standard_json: PathBuf,

    /// The solc version the contract was compiled with
    #[arg(long, default_value = DEFAULT_COMPILER_VERSION)]
    pub compiler_version: String,

    /// The source file declaring the contract, `contracts/<Contract>.sol` if omitted
    #[arg(long)]
    pub source_path: Option<String>,
}
