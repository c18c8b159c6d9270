use clap::Parser;
use royale_scripts::{
    cli::{Cli, RunOptions},
    errors::DeployError,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), DeployError> {
    let Cli {
        network,
        secrets_dir,
        artifacts_dir,
        deployments_path,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    command
        .run(RunOptions::new(
            network,
            secrets_dir,
            artifacts_dir,
            deployments_path,
        ))
        .await
}
