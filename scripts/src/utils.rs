//! Utilities for the deploy scripts.

use std::{fs, path::PathBuf, str::FromStr};

use alloy::primitives::Address;
use serde_json::{json, Map, Value};

use crate::{
    constants::{ADDRESS_KEY, BLOCK_NUMBER_KEY, DEPLOYMENTS_KEY, TRANSACTION_HASH_KEY},
    errors::DeployError,
    runner::DeploymentResult,
};

/// Read and parse a JSON file
pub fn get_json_from_file(file_path: &str) -> Result<Value, DeployError> {
    let file_contents =
        fs::read_to_string(file_path).map_err(|e| DeployError::ReadDeployments(e.to_string()))?;

    serde_json::from_str(&file_contents).map_err(|e| DeployError::ReadDeployments(e.to_string()))
}

/// Parse the address of `contract_name` on `network` from the deployments file
pub fn read_deployed_address(
    file_path: &str,
    network: &str,
    contract_name: &str,
) -> Result<Address, DeployError> {
    let parsed_json = get_json_from_file(file_path)?;

    let address = parsed_json[DEPLOYMENTS_KEY][network][contract_name][ADDRESS_KEY]
        .as_str()
        .ok_or_else(|| {
            DeployError::ReadDeployments(format!(
                "no {} deployment on {} in {}",
                contract_name, network, file_path
            ))
        })?;

    Address::from_str(address).map_err(|e| DeployError::ReadDeployments(e.to_string()))
}

/// Record a deployment in the deployments file, creating the file if needed.
///
/// A later deployment of the same contract on the same network replaces the
/// earlier entry.
pub fn write_deployment(file_path: &str, result: &DeploymentResult) -> Result<(), DeployError> {
    // If the file doesn't exist, create it
    if !PathBuf::from(file_path).exists() {
        fs::write(file_path, "{}").map_err(|e| DeployError::WriteDeployments(e.to_string()))?;
    }
    let mut parsed_json = get_json_from_file(file_path)?;

    let networks = object_entry(&mut parsed_json, DEPLOYMENTS_KEY)?;
    let contracts = object_entry(networks, &result.network)?;
    let mut entry = Map::new();
    entry.insert(ADDRESS_KEY.to_string(), json!(format!("{:#x}", result.address)));
    entry.insert(
        TRANSACTION_HASH_KEY.to_string(),
        json!(format!("{:#x}", result.transaction_hash)),
    );
    entry.insert(BLOCK_NUMBER_KEY.to_string(), json!(result.block_number));
    contracts.insert(result.contract_name.clone(), Value::Object(entry));

    let pretty = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| DeployError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, pretty).map_err(|e| DeployError::WriteDeployments(e.to_string()))?;

    Ok(())
}

/// Get the object under `key`, inserting an empty one if absent
fn object_entry<'a>(
    value: &'a mut Value,
    key: &str,
) -> Result<&'a mut Map<String, Value>, DeployError> {
    let object = value.as_object_mut().ok_or_else(|| {
        DeployError::WriteDeployments("deployments file is not a JSON object".to_string())
    })?;

    object
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| DeployError::WriteDeployments(format!("`{}` is not a JSON object", key)))
}
