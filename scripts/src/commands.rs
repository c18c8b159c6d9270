//! Implementations of the various deploy scripts

use std::{fs, path::Path};

use tracing::{error, info};

use crate::{
    artifacts::ArtifactStore,
    cli::{DeployArgs, MigrateArgs, RunOptions, VerifyArgs},
    errors::DeployError,
    migrations::{plan_specs, select_steps, MIGRATIONS},
    networks::NetworkRegistry,
    runner::{prepare_deployments, DeploymentResult, RunContext},
    secrets::SecretBundle,
    specs::{build_spec, find_interface, DeploymentSpec, ParamTable},
    transport::ProviderFactory,
    utils::read_deployed_address,
    verify::{ExplorerClient, VerificationRequest},
};

/// Run the migration plan, bounded by `--from` / `--to`
pub async fn migrate<F: ProviderFactory>(
    args: MigrateArgs,
    options: &RunOptions,
    factory: F,
) -> Result<Vec<DeploymentResult>, DeployError> {
    let params = load_params(args.params.as_deref())?;
    let steps = select_steps(&MIGRATIONS, args.from, args.to);
    if steps.is_empty() {
        info!("no migrations selected");
    }

    let specs = plan_specs(&steps, &params)?;
    run_specs(&specs, options, factory).await
}

/// Deploy a single contract
pub async fn deploy<F: ProviderFactory>(
    args: DeployArgs,
    options: &RunOptions,
    factory: F,
) -> Result<Vec<DeploymentResult>, DeployError> {
    let params = load_params(args.params.as_deref())?;
    let interface = find_interface(&args.contract, args.version)?;
    let spec = build_spec(interface, &params)?;

    run_specs(&[spec], options, factory).await
}

/// Verify a recorded deployment on the network's block explorer
pub async fn verify(args: VerifyArgs, options: &RunOptions) -> Result<(), DeployError> {
    let registry = NetworkRegistry::default();
    let profile = registry.resolve(options.network()?)?;
    let secrets = SecretBundle::load_for(profile, &options.secrets_dir)?;
    let client = ExplorerClient::for_network(profile, &secrets)?;

    let address =
        read_deployed_address(&options.deployments_path, profile.name, &args.contract)?;

    let params = load_params(args.params.as_deref())?;
    let interface = find_interface(&args.contract, args.version)?;
    let spec = build_spec(interface, &params)?;
    let artifact = ArtifactStore::new(&options.artifacts_dir).load(&spec.contract_name)?;
    let constructor_args = artifact.encode_constructor_args(&spec)?;

    let standard_json = fs::read_to_string(&args.standard_json)
        .map_err(|e| DeployError::Configuration(e.to_string()))?;
    let source_path = args
        .source_path
        .unwrap_or_else(|| format!("contracts/{}.sol", spec.contract_name));

    let request = VerificationRequest {
        address,
        qualified_name: format!("{}:{}", source_path, spec.contract_name),
        standard_json,
        compiler_version: args.compiler_version,
        constructor_args,
    };
    client.verify(&request).await?;

    println!("{} verified at {:#x}", spec.contract_name, address);
    Ok(())
}

/// Print the known networks
pub fn list_networks() -> Result<(), DeployError> {
    for profile in NetworkRegistry::default().profiles() {
        println!(
            "{} (chain id {}, {} confirmation(s), dry run {})",
            profile.name,
            profile.chain_id,
            profile.confirmations,
            if profile.skip_dry_run { "skipped" } else { "enabled" }
        );
    }

    Ok(())
}

/// Deploy the given specs in order on the selected network.
///
/// The network and its secrets are resolved before any artifact is read.
async fn run_specs<F: ProviderFactory>(
    specs: &[DeploymentSpec],
    options: &RunOptions,
    factory: F,
) -> Result<Vec<DeploymentResult>, DeployError> {
    let network = options.network()?;
    let mut context = RunContext::for_network(
        &NetworkRegistry::default(),
        network,
        &options.secrets_dir,
        factory,
    )?
    .with_poll_interval(options.poll_interval)
    .with_deployments_path(options.deployments_path.clone());

    let artifacts = ArtifactStore::new(&options.artifacts_dir);
    let deployments = prepare_deployments(specs, &artifacts)?;

    match context.run(deployments).await {
        Ok(results) => {
            info!("deployed {} contract(s) on {}", results.len(), network);
            Ok(results)
        }
        Err(failure) => {
            for result in &failure.completed {
                info!(
                    "{} remains deployed at {:#x}",
                    result.contract_name, result.address
                );
            }
            error!("{}", failure);
            Err(failure.into())
        }
    }
}

/// Load the parameter table from `path`, or use the NiftyRoyale defaults
fn load_params(path: Option<&Path>) -> Result<ParamTable, DeployError> {
    match path {
        Some(path) => ParamTable::load(path),
        None => Ok(ParamTable::nifty_royale()),
    }
}
