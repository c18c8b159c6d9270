//! The signing transport deployments are submitted through, and the factory
//! that builds it from a network profile and its secrets

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::{coins_bip39::English, MnemonicBuilder},
    transports::http::reqwest::Url,
};
use tracing::debug;

use crate::{
    constants::DEPLOYER_ACCOUNT_INDEX, errors::DeployError, networks::NetworkProfile,
    secrets::SecretBundle,
};

/// The receipt of a mined contract-creation transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    /// The hash of the creation transaction
    pub transaction_hash: TxHash,
    /// The block the transaction was included in
    pub block_number: u64,
    /// The address of the created contract
    pub contract_address: Option<Address>,
    /// Whether the transaction succeeded
    pub success: bool,
}

/// A connection to a network able to sign and submit deployments
#[allow(async_fn_in_trait)]
pub trait SigningTransport {
    /// The address deployments are sent from
    fn deployer(&self) -> Address;

    /// The deployer's balance, in wei
    async fn balance(&self) -> Result<U256, DeployError>;

    /// The current head block number
    async fn block_number(&self) -> Result<u64, DeployError>;

    /// Simulate a contract creation without submitting it
    async fn simulate_deployment(&self, code: &Bytes) -> Result<(), DeployError>;

    /// Sign and submit a contract creation, returning its transaction hash
    async fn submit_deployment(&self, code: Bytes) -> Result<TxHash, DeployError>;

    /// Fetch the receipt of a submitted transaction, if it has been mined
    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<DeploymentReceipt>, DeployError>;
}

/// Builds the signing transport for a network
#[allow(async_fn_in_trait)]
pub trait ProviderFactory {
    /// The transport type produced
    type Transport: SigningTransport;

    /// Build a transport for `profile`, signing with the mnemonic in `secrets`
    async fn create_provider(
        &self,
        profile: &NetworkProfile,
        secrets: &SecretBundle,
    ) -> Result<Self::Transport, DeployError>;
}

// ---------
// | Alloy |
// ---------

/// A [`SigningTransport`] backed by an alloy HTTP provider with a local wallet
#[derive(Clone)]
pub struct AlloyTransport {
    /// The wallet-enabled provider
    provider: DynProvider<Ethereum>,
    /// The deployer address
    deployer: Address,
}

impl SigningTransport for AlloyTransport {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn balance(&self) -> Result<U256, DeployError> {
        self.provider
            .get_balance(self.deployer)
            .await
            .map_err(|e| DeployError::Transaction(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, DeployError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| DeployError::Transaction(e.to_string()))
    }

    async fn simulate_deployment(&self, code: &Bytes) -> Result<(), DeployError> {
        let tx = self.creation_request(code.clone());
        self.provider
            .call(&tx)
            .await
            .map_err(|e| DeployError::Transaction(format!("dry run failed: {}", e)))?;

        Ok(())
    }

    async fn submit_deployment(&self, code: Bytes) -> Result<TxHash, DeployError> {
        let tx = self.creation_request(code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| DeployError::Transaction(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<DeploymentReceipt>, DeployError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| DeployError::Transaction(e.to_string()))?;

        Ok(receipt.and_then(|r| {
            Some(DeploymentReceipt {
                transaction_hash: r.transaction_hash,
                // Pending receipts have no block yet
                block_number: r.block_number?,
                contract_address: r.contract_address,
                success: r.status(),
            })
        }))
    }
}

impl AlloyTransport {
    /// A contract-creation request from the deployer
    fn creation_request(&self, code: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(code)
    }
}

/// Builds [`AlloyTransport`]s from a mnemonic and the profile's RPC URL
#[derive(Debug, Default, Clone, Copy)]
pub struct AlloyProviderFactory;

impl ProviderFactory for AlloyProviderFactory {
    type Transport = AlloyTransport;

    async fn create_provider(
        &self,
        profile: &NetworkProfile,
        secrets: &SecretBundle,
    ) -> Result<AlloyTransport, DeployError> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(secrets.mnemonic())
            .index(DEPLOYER_ACCOUNT_INDEX)
            .map_err(|e| DeployError::ProviderInitialization(e.to_string()))?
            .build()
            .map_err(|e| DeployError::ProviderInitialization(e.to_string()))?;
        let deployer = signer.address();

        let rpc_url = profile.rpc_url(secrets)?;
        let url =
            Url::parse(&rpc_url).map_err(|e| DeployError::ProviderInitialization(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .on_http(url);
        let provider = DynProvider::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| DeployError::ProviderInitialization(e.to_string()))?;
        if chain_id != profile.chain_id {
            return Err(DeployError::ProviderInitialization(format!(
                "{} expects chain id {}, endpoint reports {}",
                profile.name, profile.chain_id, chain_id
            )));
        }

        debug!("connected to {} (chain id {})", profile.name, chain_id);
        Ok(AlloyTransport { provider, deployer })
    }
}
