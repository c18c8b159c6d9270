//! Contract build artifacts and constructor argument encoding
//!
//! Arguments are checked against the constructor declared in the artifact's
//! ABI before anything is sent, so a misordered or mistyped argument list
//! fails here instead of deploying a misconfigured contract.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    hex,
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::ARTIFACT_EXTENSION,
    errors::DeployError,
    specs::{ConstructorArg, DeploymentSpec},
};

/// The creation bytecode field of an artifact.
///
/// Truffle and Hardhat emit a bare hex string, Foundry nests it under `object`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// A bare hex string
    Hex(String),
    /// A `{ "object": hex }` object
    Object {
        /// The hex string
        object: String,
    },
}

/// The subset of a build artifact the scripts need
#[derive(Deserialize)]
struct ArtifactFile {
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: BytecodeField,
}

/// The ABI and creation bytecode of a contract
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// The contract name
    pub contract_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Parse an artifact from its JSON contents
    pub fn from_json(contract_name: &str, contents: &str) -> Result<Self, DeployError> {
        let file: ArtifactFile = serde_json::from_str(contents)
            .map_err(|e| DeployError::ArtifactParsing(format!("{}: {}", contract_name, e)))?;

        let hex_code = match file.bytecode {
            BytecodeField::Hex(s) => s,
            BytecodeField::Object { object } => object,
        };
        let bytecode = hex::decode(hex_code.trim())
            .map_err(|e| DeployError::ArtifactParsing(format!("{}: {}", contract_name, e)))?;
        if bytecode.is_empty() {
            return Err(DeployError::ArtifactParsing(format!(
                "{} has no creation bytecode",
                contract_name
            )));
        }

        Ok(Self {
            contract_name: contract_name.to_string(),
            abi: file.abi,
            bytecode: bytecode.into(),
        })
    }

    /// The constructor parameters declared in the ABI
    pub fn constructor_inputs(&self) -> &[Param] {
        self.abi
            .constructor()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default()
    }

    /// Check `spec` against the declared constructor and ABI-encode its arguments
    pub fn encode_constructor_args(&self, spec: &DeploymentSpec) -> Result<Vec<u8>, DeployError> {
        let inputs = self.constructor_inputs();
        if inputs.len() != spec.constructor_args.len() {
            return Err(DeployError::ArgumentMismatch(format!(
                "{} constructor takes {} argument(s), {}@{} supplies {}",
                self.contract_name,
                inputs.len(),
                spec.contract_name,
                spec.version,
                spec.constructor_args.len()
            )));
        }

        if inputs.is_empty() {
            return Ok(vec![]);
        }

        let values = inputs
            .iter()
            .zip(spec.constructor_args.iter())
            .map(|(param, arg)| coerce_arg(param, arg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DynSolValue::Tuple(values).abi_encode_params())
    }

    /// The creation transaction input: bytecode followed by the encoded arguments
    pub fn deployment_code(&self, spec: &DeploymentSpec) -> Result<Bytes, DeployError> {
        let args = self.encode_constructor_args(spec)?;
        Ok([self.bytecode.as_ref(), args.as_slice()].concat().into())
    }
}

/// Convert a constructor argument to the ABI value the parameter declares
fn coerce_arg(param: &Param, arg: &ConstructorArg) -> Result<DynSolValue, DeployError> {
    let ty: DynSolType = param.resolve().map_err(|e| {
        DeployError::ArtifactParsing(format!("parameter `{}`: {}", param.name, e))
    })?;

    let mismatch = || {
        DeployError::ArgumentMismatch(format!(
            "parameter `{}` is `{}`, got {}",
            param.name, param.ty, arg
        ))
    };

    let value = match (arg, &ty) {
        (ConstructorArg::String(s), DynSolType::String) => DynSolValue::String(s.clone()),
        (ConstructorArg::Uint(v), DynSolType::Uint(bits)) => {
            if v.bit_len() > *bits {
                return Err(mismatch());
            }
            DynSolValue::Uint(*v, *bits)
        }
        (ConstructorArg::StringList(list), DynSolType::Array(inner))
            if **inner == DynSolType::String =>
        {
            DynSolValue::Array(list.iter().cloned().map(DynSolValue::String).collect())
        }
        (ConstructorArg::StringList(list), DynSolType::FixedArray(inner, len))
            if **inner == DynSolType::String && list.len() == *len =>
        {
            DynSolValue::FixedArray(list.iter().cloned().map(DynSolValue::String).collect())
        }
        _ => return Err(mismatch()),
    };

    Ok(value)
}

/// A directory of `<Contract>.json` build artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// The artifacts directory
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store reading from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The path of a contract's artifact
    pub fn artifact_path(&self, contract_name: &str) -> PathBuf {
        self.dir
            .join(contract_name)
            .with_extension(ARTIFACT_EXTENSION)
    }

    /// Load the artifact of a contract
    pub fn load(&self, contract_name: &str) -> Result<ContractArtifact, DeployError> {
        let path = self.artifact_path(contract_name);
        debug!("loading artifact {}", path.display());
        let contents = read_artifact(&path)?;
        ContractArtifact::from_json(contract_name, &contents)
    }
}

/// Read an artifact file
fn read_artifact(path: &Path) -> Result<String, DeployError> {
    fs::read_to_string(path)
        .map_err(|e| DeployError::ArtifactParsing(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use alloy::{
        dyn_abi::{DynSolType, DynSolValue},
        primitives::U256,
    };

    use super::{ArtifactStore, ContractArtifact};
    use crate::{
        errors::DeployError,
        specs::{build_spec, find_interface, ConstructorArg, DeploymentSpec, ParamTable},
    };

    /// An artifact with the six-argument `BattleRoyale` constructor
    const BATTLE_ROYALE_ARTIFACT: &str = r#"{
        "contractName": "BattleRoyale",
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "_name", "type": "string", "internalType": "string" },
                    { "name": "_symbol", "type": "string", "internalType": "string" },
                    { "name": "_price", "type": "uint256", "internalType": "uint256" },
                    { "name": "_unitsPerTransaction", "type": "uint256", "internalType": "uint256" },
                    { "name": "_maxSupply", "type": "uint256", "internalType": "uint256" },
                    { "name": "_baseURI", "type": "string", "internalType": "string" }
                ]
            }
        ],
        "bytecode": "0x6080604052"
    }"#;

    /// An artifact with the URI list `BattleRoyaleRandom` constructor, in Foundry layout
    const RANDOM_ARTIFACT: &str = r#"{
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "_name", "type": "string", "internalType": "string" },
                    { "name": "_symbol", "type": "string", "internalType": "string" },
                    { "name": "_price", "type": "uint256", "internalType": "uint256" },
                    { "name": "_unitsPerTransaction", "type": "uint256", "internalType": "uint256" },
                    { "name": "_maxSupply", "type": "uint256", "internalType": "uint256" },
                    { "name": "_defaultTokenURIs", "type": "string[]", "internalType": "string[]" }
                ]
            }
        ],
        "bytecode": { "object": "0x6080604052" }
    }"#;

    fn battle_royale_spec() -> DeploymentSpec {
        let interface = find_interface("BattleRoyale", Some(1)).unwrap();
        build_spec(interface, &ParamTable::nifty_royale()).unwrap()
    }

    #[test]
    fn test_large_price_round_trips() {
        let artifact = ContractArtifact::from_json("BattleRoyale", BATTLE_ROYALE_ARTIFACT).unwrap();
        let encoded = artifact.encode_constructor_args(&battle_royale_spec()).unwrap();

        let types = DynSolType::Tuple(vec![
            DynSolType::String,
            DynSolType::String,
            DynSolType::Uint(256),
            DynSolType::Uint(256),
            DynSolType::Uint(256),
            DynSolType::String,
        ]);
        let decoded = types.abi_decode_params(&encoded).unwrap();
        let DynSolValue::Tuple(values) = decoded else {
            panic!("expected a tuple");
        };

        assert_eq!(values[0], DynSolValue::String("NiftyRoyale".to_string()));
        match &values[2] {
            DynSolValue::Uint(price, 256) => assert_eq!(price.to_string(), "10000000000000000"),
            other => panic!("expected a uint256, got {other:?}"),
        }
        assert_eq!(
            values[5],
            DynSolValue::String("https://app.niftyroyale.com/".to_string())
        );
    }

    #[test]
    fn test_deployment_code_prefixed_with_bytecode() {
        let artifact = ContractArtifact::from_json("BattleRoyale", BATTLE_ROYALE_ARTIFACT).unwrap();
        let spec = battle_royale_spec();

        let code = artifact.deployment_code(&spec).unwrap();
        let args = artifact.encode_constructor_args(&spec).unwrap();
        assert!(code.starts_with(&[0x60, 0x80, 0x60, 0x40, 0x52]));
        assert_eq!(code.len(), 5 + args.len());
    }

    #[test]
    fn test_string_list_encoding() {
        let artifact = ContractArtifact::from_json("BattleRoyaleRandom", RANDOM_ARTIFACT).unwrap();
        let interface = find_interface("BattleRoyaleRandom", Some(2)).unwrap();
        let spec = build_spec(interface, &ParamTable::nifty_royale()).unwrap();

        assert!(artifact.encode_constructor_args(&spec).is_ok());
    }

    #[test]
    fn test_arity_mismatch() {
        let artifact = ContractArtifact::from_json("BattleRoyaleRandom", RANDOM_ARTIFACT).unwrap();
        // The five argument shape of the same contract
        let interface = find_interface("BattleRoyaleRandom", Some(1)).unwrap();
        let spec = build_spec(interface, &ParamTable::nifty_royale()).unwrap();

        assert!(matches!(
            artifact.encode_constructor_args(&spec),
            Err(DeployError::ArgumentMismatch(_))
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let artifact = ContractArtifact::from_json("BattleRoyale", BATTLE_ROYALE_ARTIFACT).unwrap();
        let mut spec = battle_royale_spec();
        // Swap the price and the symbol
        spec.constructor_args.swap(1, 2);

        assert!(matches!(
            artifact.encode_constructor_args(&spec),
            Err(DeployError::ArgumentMismatch(_))
        ));
    }

    #[test]
    fn test_uint_overflow_rejected() {
        let contents = BATTLE_ROYALE_ARTIFACT.replace(
            r#""name": "_maxSupply", "type": "uint256""#,
            r#""name": "_maxSupply", "type": "uint8""#,
        );
        let artifact = ContractArtifact::from_json("BattleRoyale", &contents).unwrap();
        let mut spec = battle_royale_spec();
        spec.constructor_args[4] = ConstructorArg::Uint(U256::from(256));

        assert!(matches!(
            artifact.encode_constructor_args(&spec),
            Err(DeployError::ArgumentMismatch(_))
        ));
    }

    #[test]
    fn test_no_constructor_takes_no_args() {
        let artifact =
            ContractArtifact::from_json("ChainlinkBattle", r#"{ "abi": [], "bytecode": "0x60" }"#)
                .unwrap();

        let spec = DeploymentSpec::without_args("ChainlinkBattle", 0);
        assert_eq!(artifact.deployment_code(&spec).unwrap().len(), 1);
        assert!(artifact.encode_constructor_args(&battle_royale_spec()).is_err());
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let res = ContractArtifact::from_json("IBattle", r#"{ "abi": [], "bytecode": "0x" }"#);
        assert!(matches!(res, Err(DeployError::ArtifactParsing(_))));
    }

    #[test]
    fn test_store_reads_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BattleRoyale.json"), BATTLE_ROYALE_ARTIFACT).unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(store.load("BattleRoyale").is_ok());
        assert!(matches!(
            store.load("ChainlinkBattle"),
            Err(DeployError::ArtifactParsing(_))
        ));
    }
}
