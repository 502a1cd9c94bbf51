//! Disbursement round configuration.

use crate::calls::TransferMode;
use alloy::primitives::{Address, ChainId};
use alloy_chains::Chain;
use eyre::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};
use url::Url;

/// Default number of decimals for the paid token.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Configuration for a single disbursement round.
///
/// Loaded once at startup from a YAML file and read-only afterwards. The
/// recipient order is preserved exactly through encoding and assembly, so the
/// order in the file is the on-chain execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementConfig {
    /// The stipend per recipient, denominated in `fiat_unit`.
    pub fiat_amount: Decimal,
    /// The price feed identifier of the paid token (e.g. `decentraland`).
    pub asset: String,
    /// The fiat unit the stipend is denominated in (e.g. `usd`).
    pub fiat_unit: String,
    /// The chain the Safe and the token live on.
    pub chain: ChainKind,
    /// The ERC-20 token contract address.
    pub token: Address,
    /// The recipients, in execution order.
    pub recipients: Vec<Address>,
    /// Whether tokens are sent from the Safe itself or pulled from a
    /// pre-approved treasury address.
    #[serde(default)]
    pub transfer_mode: TransferMode,
    /// The token's number of decimals.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Base URL of the price feed.
    #[serde(default = "default_price_feed")]
    pub price_feed: Url,
    /// Base URL of the Safe transaction service. Defaults per chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_service: Option<Url>,
}

fn default_decimals() -> u8 {
    DEFAULT_TOKEN_DECIMALS
}

fn default_price_feed() -> Url {
    "https://api.coingecko.com/api/v3/".parse().expect("static url")
}

impl DisbursementConfig {
    /// Loads the round configuration from a YAML file.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let file = File::open(path)
            .wrap_err_with(|| format!("could not open round config at {}", path.display()))?;
        let config: Self = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("could not parse round config at {}", path.display()))?;
        Ok(config)
    }

    /// The transaction service endpoint for this round.
    pub fn tx_service_url(&self) -> Url {
        self.tx_service.clone().unwrap_or_else(|| self.chain.default_tx_service())
    }
}

/// Supported deployment chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    /// Ethereum mainnet.
    Mainnet,
    /// Polygon PoS.
    Polygon,
}

impl ChainKind {
    /// The chain identifier.
    pub fn chain(&self) -> Chain {
        match self {
            Self::Mainnet => Chain::mainnet(),
            Self::Polygon => Chain::from_id(137),
        }
    }

    /// The numeric chain id.
    pub fn id(&self) -> ChainId {
        self.chain().id()
    }

    /// The canonical Safe transaction service for this chain.
    pub fn default_tx_service(&self) -> Url {
        let url = match self {
            Self::Mainnet => "https://safe-transaction-mainnet.safe.global/",
            Self::Polygon => "https://safe-transaction-polygon.safe.global/",
        };
        url.parse().expect("static url")
    }
}
