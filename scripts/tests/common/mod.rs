//! An in-memory chain standing in for a real network

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use royale_scripts::{
    errors::DeployError,
    networks::{NetworkProfile, NETWORKS},
    runner::{PreparedDeployment, RunContext},
    secrets::SecretBundle,
    specs::DeploymentSpec,
    transport::{DeploymentReceipt, ProviderFactory, SigningTransport},
};
use serde_json::json;

/// A throwaway mnemonic, never used to sign anything
pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// What the mock chain has seen
#[derive(Default)]
pub struct ChainLog {
    /// The current head block
    pub head: u64,
    /// The creation code of every submitted deployment, in order
    pub submitted: Vec<Bytes>,
    /// The block each submitted deployment is mined in
    pub mined_at: Vec<u64>,
    /// The number of simulated deployments
    pub simulated: usize,
    /// The number of transports built
    pub connections: usize,
}

/// How the mock chain misbehaves
#[derive(Clone, Copy, Default)]
pub struct Faults {
    /// Reject the submission with this index
    pub reject_submission: Option<usize>,
    /// Revert the deployment with this index
    pub revert: Option<usize>,
    /// Never mine anything
    pub never_mine: bool,
    /// Fail to build a transport
    pub refuse_connection: bool,
}

/// A transport over the shared mock chain
pub struct MockTransport {
    /// The chain state
    log: Arc<Mutex<ChainLog>>,
    /// The configured faults
    faults: Faults,
}

impl SigningTransport for MockTransport {
    fn deployer(&self) -> Address {
        Address::repeat_byte(0xde)
    }

    async fn balance(&self) -> Result<U256, DeployError> {
        Ok(U256::from(10).pow(U256::from(18)))
    }

    async fn block_number(&self) -> Result<u64, DeployError> {
        // Every poll advances the chain by one block
        let mut log = self.log.lock().unwrap();
        log.head += 1;
        Ok(log.head)
    }

    async fn simulate_deployment(&self, _code: &Bytes) -> Result<(), DeployError> {
        self.log.lock().unwrap().simulated += 1;
        Ok(())
    }

    async fn submit_deployment(&self, code: Bytes) -> Result<TxHash, DeployError> {
        let mut log = self.log.lock().unwrap();
        let index = log.submitted.len();
        if self.faults.reject_submission == Some(index) {
            return Err(DeployError::Transaction("insufficient funds".to_string()));
        }

        let mined_at = log.head + 1;
        log.submitted.push(code);
        log.mined_at.push(mined_at);
        Ok(tx_hash(index))
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<DeploymentReceipt>, DeployError> {
        let log = self.log.lock().unwrap();
        let index = match (0..log.submitted.len()).find(|i| tx_hash(*i) == hash) {
            Some(index) => index,
            None => return Ok(None),
        };

        let mined_at = log.mined_at[index];
        if self.faults.never_mine || log.head < mined_at {
            return Ok(None);
        }

        Ok(Some(DeploymentReceipt {
            transaction_hash: hash,
            block_number: mined_at,
            contract_address: Some(contract_address(index)),
            success: self.faults.revert != Some(index),
        }))
    }
}

/// Builds [`MockTransport`]s over a shared chain
#[derive(Clone, Default)]
pub struct MockFactory {
    /// The chain state shared with every transport
    pub log: Arc<Mutex<ChainLog>>,
    /// The faults handed to every transport
    pub faults: Faults,
}

impl MockFactory {
    /// A well-behaved chain
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with the given faults
    pub fn with_faults(faults: Faults) -> Self {
        Self {
            faults,
            ..Self::default()
        }
    }

    /// The number of deployments submitted so far
    pub fn submitted(&self) -> usize {
        self.log.lock().unwrap().submitted.len()
    }

    /// The number of deployments simulated so far
    pub fn simulated(&self) -> usize {
        self.log.lock().unwrap().simulated
    }

    /// The number of transports built so far
    pub fn connections(&self) -> usize {
        self.log.lock().unwrap().connections
    }
}

impl ProviderFactory for MockFactory {
    type Transport = MockTransport;

    async fn create_provider(
        &self,
        _profile: &NetworkProfile,
        _secrets: &SecretBundle,
    ) -> Result<MockTransport, DeployError> {
        if self.faults.refuse_connection {
            return Err(DeployError::ProviderInitialization("connection refused".to_string()));
        }

        self.log.lock().unwrap().connections += 1;
        Ok(MockTransport {
            log: self.log.clone(),
            faults: self.faults,
        })
    }
}

/// The hash the mock chain assigns to the `index`th submission
pub fn tx_hash(index: usize) -> TxHash {
    TxHash::repeat_byte(index as u8 + 1)
}

/// The address the mock chain assigns to the `index`th deployment
pub fn contract_address(index: usize) -> Address {
    Address::repeat_byte(index as u8 + 0x10)
}

/// The mumbai profile
pub fn mumbai() -> NetworkProfile {
    NETWORKS[0].clone()
}

/// A run context over `profile` with a fast poll interval
pub fn context(profile: NetworkProfile, factory: MockFactory) -> RunContext<MockFactory> {
    let secrets = SecretBundle::new(TEST_MNEMONIC.to_string(), BTreeMap::new());
    RunContext::new(profile, secrets, factory).with_poll_interval(Duration::from_millis(1))
}

/// A deployment of `contract_name` with placeholder creation code
pub fn prepared(contract_name: &str) -> PreparedDeployment {
    PreparedDeployment {
        spec: DeploymentSpec::without_args(contract_name, 1),
        code: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]),
    }
}

/// A build artifact whose constructor takes the given solidity types
pub fn artifact_json(input_types: &[&str]) -> String {
    let inputs: Vec<_> = input_types
        .iter()
        .enumerate()
        .map(|(i, ty)| json!({ "name": format!("_arg{}", i), "type": ty, "internalType": ty }))
        .collect();

    json!({
        "abi": [{ "type": "constructor", "stateMutability": "nonpayable", "inputs": inputs }],
        "bytecode": "0x6080604052",
    })
    .to_string()
}
