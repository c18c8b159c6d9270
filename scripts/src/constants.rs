//! Constants used in the deploy scripts

use std::time::Duration;

/// The account index derived from the mnemonic used as the deployer
pub const DEPLOYER_ACCOUNT_INDEX: u32 = 0;

/// The interval between receipt / block number polls while waiting for confirmations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// The placeholder for the Infura API key in RPC URL templates
pub const INFURA_API_KEY_PLACEHOLDER: &str = "{infura_api_key}";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The address key of a deployment entry in the `deployments.json` file
pub const ADDRESS_KEY: &str = "address";

/// The transaction hash key of a deployment entry in the `deployments.json` file
pub const TRANSACTION_HASH_KEY: &str = "transaction_hash";

/// The block number key of a deployment entry in the `deployments.json` file
pub const BLOCK_NUMBER_KEY: &str = "block_number";

/// The default directory containing the contract build artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The default path of the deployments ledger
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The extension of a contract build artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The solc version the contracts are compiled with, in the form block explorers expect
pub const DEFAULT_COMPILER_VERSION: &str = "v0.8.6+commit.11564f7e";

/// The code format used when submitting sources for verification
pub const STANDARD_JSON_CODE_FORMAT: &str = "solidity-standard-json-input";

/// The number of times to poll the explorer for a verification verdict
pub const VERIFICATION_STATUS_ATTEMPTS: usize = 10;

/// The interval between verification status polls
pub const VERIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The explorer response status indicating success
pub const EXPLORER_STATUS_OK: &str = "1";

/// The explorer result while a verification is still queued
pub const EXPLORER_PENDING_RESULT: &str = "Pending in queue";

/// The explorer result when the contract was verified previously
pub const EXPLORER_ALREADY_VERIFIED_RESULT: &str = "Already Verified";

// -------------------
// | NiftyRoyale set |
// -------------------

/// The token name of the NiftyRoyale collection
pub const NIFTY_ROYALE_NAME: &str = "NiftyRoyale";

/// The token symbol of the NiftyRoyale collection
pub const NIFTY_ROYALE_SYMBOL: &str = "NYR";

/// The mint price, in wei (0.01 MATIC)
pub const NIFTY_ROYALE_PRICE_WEI: &str = "10000000000000000";

/// The number of teams
pub const NIFTY_ROYALE_TEAM_COUNT: u64 = 5;

/// The maximum token supply
pub const NIFTY_ROYALE_MAX_SUPPLY: u64 = 100;

/// The base token URI
pub const NIFTY_ROYALE_BASE_URI: &str = "https://app.niftyroyale.com/";

/// The token URIs handed out at random
pub const NIFTY_ROYALE_URIS: [&str; 4] = [
    "https://app.niftyroyale.com/1",
    "https://app.niftyroyale.com/2",
    "https://app.niftyroyale.com/3",
    "https://app.niftyroyale.com/4",
];

/// The URI of a piece that is still in play
pub const NIFTY_ROYALE_DEFAULT_URI: &str = "https://app.niftyroyale.com/1";

/// The URI of the winning piece
pub const NIFTY_ROYALE_PRIZE_URI: &str = "https://app.niftyroyale.com/2";
