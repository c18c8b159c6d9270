//! Source verification against Etherscan-compatible block explorers

use alloy::{hex, primitives::Address, transports::http::reqwest};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    constants::{
        EXPLORER_ALREADY_VERIFIED_RESULT, EXPLORER_PENDING_RESULT, EXPLORER_STATUS_OK,
        STANDARD_JSON_CODE_FORMAT, VERIFICATION_POLL_INTERVAL, VERIFICATION_STATUS_ATTEMPTS,
    },
    errors::DeployError,
    networks::NetworkProfile,
    secrets::SecretBundle,
};

/// The envelope every explorer API response comes in
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExplorerResponse {
    /// `"1"` on success, `"0"` otherwise
    pub status: String,
    /// A short status message
    pub message: String,
    /// The payload: a GUID, a verdict, or an error description
    pub result: String,
}

/// The verdict of a verification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Still queued at the explorer
    Pending,
    /// Verified by this request
    Verified,
    /// Verified by an earlier request
    AlreadyVerified,
    /// Rejected, with the explorer's reason
    Failed(String),
}

impl From<ExplorerResponse> for VerificationStatus {
    fn from(response: ExplorerResponse) -> Self {
        if response.result == EXPLORER_PENDING_RESULT {
            VerificationStatus::Pending
        } else if response.result.contains(EXPLORER_ALREADY_VERIFIED_RESULT) {
            VerificationStatus::AlreadyVerified
        } else if response.status == EXPLORER_STATUS_OK {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Failed(response.result)
        }
    }
}

/// Parse an explorer response body
pub fn parse_response(body: &str) -> Result<ExplorerResponse, DeployError> {
    serde_json::from_str(body)
        .map_err(|e| DeployError::Verification(format!("unexpected explorer response: {}", e)))
}

/// The sources and metadata of a deployed contract to verify
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// The deployed contract address
    pub address: Address,
    /// The fully qualified contract name, e.g. `contracts/BattleRoyale.sol:BattleRoyale`
    pub qualified_name: String,
    /// The solc standard-json input the contract was compiled from
    pub standard_json: String,
    /// The compiler version, e.g. `v0.8.6+commit.11564f7e`
    pub compiler_version: String,
    /// The ABI-encoded constructor arguments
    pub constructor_args: Vec<u8>,
}

impl VerificationRequest {
    /// The form fields of a `verifysourcecode` submission, minus the API key
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", format!("{:#x}", self.address)),
            ("sourceCode", self.standard_json.clone()),
            ("codeformat", STANDARD_JSON_CODE_FORMAT.to_string()),
            ("contractname", self.qualified_name.clone()),
            ("compilerversion", self.compiler_version.clone()),
            // Sic, the explorer API spells it this way
            ("constructorArguements", hex::encode(&self.constructor_args)),
        ]
    }
}

/// A client for an Etherscan-compatible explorer API
#[derive(Clone)]
pub struct ExplorerClient {
    /// The API endpoint
    api_url: String,
    /// The API key
    api_key: String,
    /// The HTTP client
    http: reqwest::Client,
}

impl ExplorerClient {
    /// Create a client for the explorer of `profile`
    pub fn for_network(profile: &NetworkProfile, secrets: &SecretBundle) -> Result<Self, DeployError> {
        let api_url = profile.explorer_api_url.ok_or_else(|| {
            DeployError::Configuration(format!("{} has no block explorer", profile.name))
        })?;
        let kind = profile.explorer_api_key.ok_or_else(|| {
            DeployError::Configuration(format!("{} has no explorer API key kind", profile.name))
        })?;
        let api_key = secrets.api_key(kind).ok_or_else(|| {
            DeployError::Configuration(format!(
                "verifying on {} requires `{}` in {}",
                profile.name, kind, profile.secrets_file
            ))
        })?;

        Ok(Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        })
    }

    /// Submit a verification request, returning the explorer's GUID for it
    pub async fn submit(&self, request: &VerificationRequest) -> Result<String, DeployError> {
        let mut form = request.form_fields();
        form.push(("apikey", self.api_key.clone()));

        let body = self
            .http
            .post(&self.api_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| DeployError::Verification(e.to_string()))?
            .text()
            .await
            .map_err(|e| DeployError::Verification(e.to_string()))?;

        let response = parse_response(&body)?;
        if response.status != EXPLORER_STATUS_OK {
            return Err(DeployError::Verification(response.result));
        }

        Ok(response.result)
    }

    /// Fetch the verdict of a submitted request
    pub async fn check_status(&self, guid: &str) -> Result<VerificationStatus, DeployError> {
        let query = [
            ("module", "contract"),
            ("action", "checkverifystatus"),
            ("guid", guid),
            ("apikey", self.api_key.as_str()),
        ];

        let body = self
            .http
            .get(&self.api_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| DeployError::Verification(e.to_string()))?
            .text()
            .await
            .map_err(|e| DeployError::Verification(e.to_string()))?;

        parse_response(&body).map(VerificationStatus::from)
    }

    /// Submit a request and poll until the explorer reaches a verdict
    pub async fn verify(&self, request: &VerificationRequest) -> Result<(), DeployError> {
        let guid = match self.submit(request).await {
            Ok(guid) => guid,
            Err(DeployError::Verification(reason))
                if reason.contains(EXPLORER_ALREADY_VERIFIED_RESULT) =>
            {
                info!("{:#x} is already verified", request.address);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        info!("verification of {:#x} submitted as {}", request.address, guid);

        for _ in 0..VERIFICATION_STATUS_ATTEMPTS {
            tokio::time::sleep(VERIFICATION_POLL_INTERVAL).await;
            match self.check_status(&guid).await? {
                VerificationStatus::Pending => debug!("verification {} pending", guid),
                VerificationStatus::Verified | VerificationStatus::AlreadyVerified => {
                    return Ok(())
                }
                VerificationStatus::Failed(reason) => {
                    return Err(DeployError::Verification(reason))
                }
            }
        }

        Err(DeployError::Verification(format!(
            "no verdict for {} after {} checks",
            guid, VERIFICATION_STATUS_ATTEMPTS
        )))
    }
}
