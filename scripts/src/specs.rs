//! Constructor argument assembly for the deployable contracts
//!
//! Every constructor shape the contracts have shipped with is kept as its own
//! versioned [`ContractInterface`]. A [`ParamTable`] holds the literal values
//! for a collection, and [`build_spec`] picks the fields an interface declares,
//! in the order it declares them.

use std::{
    fmt::{self, Display},
    fs,
    path::Path,
};

use alloy::primitives::U256;
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    constants::{
        NIFTY_ROYALE_BASE_URI, NIFTY_ROYALE_DEFAULT_URI, NIFTY_ROYALE_MAX_SUPPLY,
        NIFTY_ROYALE_NAME, NIFTY_ROYALE_PRICE_WEI, NIFTY_ROYALE_PRIZE_URI,
        NIFTY_ROYALE_SYMBOL, NIFTY_ROYALE_TEAM_COUNT, NIFTY_ROYALE_URIS,
    },
    errors::DeployError,
};

// ---------
// | Types |
// ---------

/// A single typed constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A `string`
    String(String),
    /// An unsigned integer of up to 256 bits
    Uint(U256),
    /// A `string[]`
    StringList(Vec<String>),
}

impl Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::String(s) => write!(f, "{:?}", s),
            ConstructorArg::Uint(v) => write!(f, "{}", v),
            ConstructorArg::StringList(l) => {
                write!(f, "[{}]", l.iter().map(|s| format!("{:?}", s)).join(", "))
            }
        }
    }
}

/// A contract to deploy along with its ordered constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSpec {
    /// The name of the contract, matching its build artifact
    pub contract_name: String,
    /// The version of the constructor interface the arguments were built for
    pub version: u32,
    /// The constructor arguments, in declaration order
    pub constructor_args: Vec<ConstructorArg>,
}

impl DeploymentSpec {
    /// A spec for a contract whose constructor takes no arguments
    pub fn without_args(contract_name: &str, version: u32) -> Self {
        Self {
            contract_name: contract_name.to_string(),
            version,
            constructor_args: vec![],
        }
    }
}

/// The literal constructor parameters of a collection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamTable {
    /// The token name
    pub name: String,
    /// The token symbol
    pub symbol: String,
    /// The mint price in wei, as a decimal string
    pub price_wei: String,
    /// The number of teams
    pub team_count: u64,
    /// The maximum token supply
    pub max_supply: u64,
    /// The base token URI
    #[serde(default)]
    pub base_uri: Option<String>,
    /// The token URIs handed out at random
    #[serde(default)]
    pub uris: Vec<String>,
    /// The URI of a piece still in play
    #[serde(default)]
    pub default_uri: Option<String>,
    /// The URI of the winning piece
    #[serde(default)]
    pub prize_uri: Option<String>,
    /// The auction deadline as a unix timestamp
    #[serde(default)]
    pub deadline: Option<u64>,
}

impl ParamTable {
    /// The parameters of the NiftyRoyale collection
    pub fn nifty_royale() -> Self {
        Self {
            name: NIFTY_ROYALE_NAME.to_string(),
            symbol: NIFTY_ROYALE_SYMBOL.to_string(),
            price_wei: NIFTY_ROYALE_PRICE_WEI.to_string(),
            team_count: NIFTY_ROYALE_TEAM_COUNT,
            max_supply: NIFTY_ROYALE_MAX_SUPPLY,
            base_uri: Some(NIFTY_ROYALE_BASE_URI.to_string()),
            uris: NIFTY_ROYALE_URIS.iter().map(|s| s.to_string()).collect(),
            default_uri: Some(NIFTY_ROYALE_DEFAULT_URI.to_string()),
            prize_uri: Some(NIFTY_ROYALE_PRIZE_URI.to_string()),
            deadline: None,
        }
    }

    /// Read a parameter table from a JSON file
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DeployError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| DeployError::Configuration(format!("{}: {}", path.display(), e)))
    }
}

/// A constructor parameter, named by its role
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParamField {
    /// The token name
    Name,
    /// The token symbol
    Symbol,
    /// The mint price in wei
    Price,
    /// The number of teams
    TeamCount,
    /// The maximum token supply
    MaxSupply,
    /// The base token URI
    BaseUri,
    /// The list of token URIs
    Uris,
    /// The URI of a piece still in play
    DefaultUri,
    /// The URI of the winning piece
    PrizeUri,
    /// The auction deadline; omitted from the arguments when unset
    Deadline,
}

impl Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamField::Name => "name",
            ParamField::Symbol => "symbol",
            ParamField::Price => "price_wei",
            ParamField::TeamCount => "team_count",
            ParamField::MaxSupply => "max_supply",
            ParamField::BaseUri => "base_uri",
            ParamField::Uris => "uris",
            ParamField::DefaultUri => "default_uri",
            ParamField::PrizeUri => "prize_uri",
            ParamField::Deadline => "deadline",
        };
        write!(f, "{}", name)
    }
}

/// A versioned constructor shape of a contract
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContractInterface {
    /// The contract name
    pub contract_name: &'static str,
    /// The interface version
    pub version: u32,
    /// The constructor parameters, in declaration order
    pub fields: &'static [ParamField],
}

impl Display for ContractInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.contract_name, self.version)
    }
}

// -----------
// | Catalog |
// -----------

/// The shared collection fields followed by the given extra fields
macro_rules! fields {
    ($($field:ident),* $(,)?) => {
        &[
            ParamField::Name,
            ParamField::Symbol,
            ParamField::Price,
            ParamField::TeamCount,
            ParamField::MaxSupply,
            $(ParamField::$field),*
        ]
    };
}

/// Every known constructor interface
pub static INTERFACES: [ContractInterface; 9] = [
    ContractInterface {
        contract_name: "BattleRoyale",
        version: 0,
        fields: &[],
    },
    ContractInterface {
        contract_name: "BattleRoyale",
        version: 1,
        fields: fields!(BaseUri),
    },
    ContractInterface {
        contract_name: "BattleRoyale",
        version: 2,
        fields: fields!(BaseUri, Deadline),
    },
    ContractInterface {
        contract_name: "BattleRoyaleRandom",
        version: 0,
        fields: &[],
    },
    ContractInterface {
        contract_name: "BattleRoyaleRandom",
        version: 1,
        fields: fields!(),
    },
    ContractInterface {
        contract_name: "BattleRoyaleRandom",
        version: 2,
        fields: fields!(Uris),
    },
    ContractInterface {
        contract_name: "BattleRoyalePiece",
        version: 1,
        fields: fields!(DefaultUri, PrizeUri),
    },
    ContractInterface {
        contract_name: "BattleRoyaleRandomPart",
        version: 1,
        fields: fields!(),
    },
    ContractInterface {
        contract_name: "ChainlinkBattle",
        version: 0,
        fields: &[],
    },
];

/// Look up a constructor interface.
///
/// Without a version the latest interface of the contract is returned.
pub fn find_interface(
    contract_name: &str,
    version: Option<u32>,
) -> Result<&'static ContractInterface, DeployError> {
    let mut candidates = INTERFACES
        .iter()
        .filter(|i| i.contract_name == contract_name);

    let found = match version {
        Some(v) => candidates.find(|i| i.version == v),
        None => candidates.max_by_key(|i| i.version),
    };

    found.ok_or_else(|| {
        let wanted = version.map(|v| format!("{}@{}", contract_name, v));
        DeployError::Configuration(format!(
            "no constructor interface for {}",
            wanted.unwrap_or_else(|| contract_name.to_string())
        ))
    })
}

// -----------
// | Builder |
// -----------

/// Parse a decimal integer literal into a [`U256`]
pub fn parse_uint(literal: &str) -> Result<U256, DeployError> {
    let trimmed = literal.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DeployError::Configuration(format!(
            "`{}` is not a decimal integer",
            literal
        )));
    }

    U256::from_str_radix(trimmed, 10)
        .map_err(|e| DeployError::Configuration(format!("`{}`: {}", literal, e)))
}

/// Assemble the constructor arguments of `interface` from `params`.
///
/// Pure and deterministic: arguments come out in exactly the order the
/// interface declares. An unset deadline is left off the end.
pub fn build_spec(
    interface: &ContractInterface,
    params: &ParamTable,
) -> Result<DeploymentSpec, DeployError> {
    let missing = |field: ParamField| {
        DeployError::Configuration(format!("{} requires `{}`", interface, field))
    };

    let mut constructor_args = Vec::with_capacity(interface.fields.len());
    for field in interface.fields {
        let arg = match field {
            ParamField::Name => ConstructorArg::String(params.name.clone()),
            ParamField::Symbol => ConstructorArg::String(params.symbol.clone()),
            ParamField::Price => ConstructorArg::Uint(parse_uint(&params.price_wei)?),
            ParamField::TeamCount => ConstructorArg::Uint(U256::from(params.team_count)),
            ParamField::MaxSupply => ConstructorArg::Uint(U256::from(params.max_supply)),
            ParamField::BaseUri => {
                ConstructorArg::String(params.base_uri.clone().ok_or_else(|| missing(*field))?)
            }
            ParamField::Uris => {
                if params.uris.is_empty() {
                    return Err(missing(*field));
                }
                ConstructorArg::StringList(params.uris.clone())
            }
            ParamField::DefaultUri => ConstructorArg::String(
                params.default_uri.clone().ok_or_else(|| missing(*field))?,
            ),
            ParamField::PrizeUri => {
                ConstructorArg::String(params.prize_uri.clone().ok_or_else(|| missing(*field))?)
            }
            ParamField::Deadline => match params.deadline {
                Some(deadline) => ConstructorArg::Uint(U256::from(deadline)),
                None => continue,
            },
        };
        constructor_args.push(arg);
    }

    Ok(DeploymentSpec {
        contract_name: interface.contract_name.to_string(),
        version: interface.version,
        constructor_args,
    })
}
