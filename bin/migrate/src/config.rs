//! Network presets, holder lists and deployment data.

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use cards_migrator::{PackPurchase, GWEI};
use clap::ValueEnum;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt, path::Path};

/// Deployment namespace of the token migrator contract.
pub const TOKEN_MIGRATOR: &str = "cryptocardscontracts/CryptoCardsTokenMigrator";
/// Deployment namespace of the card library contract.
pub const CARD_LIBRARY: &str = "cryptocardscontracts/CryptoCardsLib";
/// Deployment namespace of the controller contract.
pub const CONTROLLER: &str = "cryptocardscontracts/CryptoCardsController";

/// The networks the migration can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    /// A local development node.
    Local,
    /// The public test network.
    #[value(alias = "ropsten")]
    Testnet,
    /// Ethereum mainnet.
    Mainnet,
}

/// Per-network defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Gas price floor, in wei.
    pub min_gas_price: u128,
    /// Gas price ceiling, in wei.
    pub max_gas_price: u128,
    /// JSON-RPC endpoint used when none is given.
    pub default_rpc_url: Option<&'static str>,
}

impl Network {
    /// Returns the lowercase network name used in file names.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        }
    }

    /// Returns the defaults for this network.
    pub const fn config(&self) -> NetworkConfig {
        match self {
            Self::Local => NetworkConfig {
                min_gas_price: GWEI,
                max_gas_price: 20 * GWEI,
                default_rpc_url: Some("http://127.0.0.1:8545"),
            },
            Self::Testnet => NetworkConfig {
                min_gas_price: GWEI,
                max_gas_price: 20 * GWEI,
                default_rpc_url: None,
            },
            Self::Mainnet => NetworkConfig {
                min_gas_price: GWEI,
                max_gas_price: GWEI,
                default_rpc_url: None,
            },
        }
    }

    /// Returns the name of the migration state file.
    pub fn state_file_name(&self) -> String {
        format!("migration-state-{}.json", self.name())
    }

    /// Returns the default deployment data file name.
    pub fn deploy_data_file_name(&self) -> String {
        format!("zos.{}.json", self.name())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The holders to migrate.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsFile {
    /// Gum (ERC20) holders.
    #[serde(default)]
    pub erc20: Vec<Address>,
    /// Pack and card (ERC721) holders.
    #[serde(default)]
    pub erc721: Vec<Address>,
    /// Legacy pack purchase counts.
    #[serde(default)]
    pub pack_purchasers: Vec<PackPurchase>,
}

impl AccountsFile {
    /// Reads the holder lists from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading accounts file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing accounts file {}", path.display()))
    }
}

/// One deployed proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyEntry {
    /// Proxy address.
    pub address: Address,
}

/// The deployment data written when the contracts were deployed.
///
/// Only the proxy addresses are read; every other field is ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct DeployData {
    /// Deployed proxies by contract namespace.
    #[serde(default)]
    pub proxies: BTreeMap<String, Vec<ProxyEntry>>,
}

impl DeployData {
    /// Reads deployment data from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading deploy data {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing deploy data {}", path.display()))
    }

    /// Returns the address of the `index`th deployment of `namespace`.
    pub fn address_of(&self, namespace: &str, index: usize) -> Result<Address> {
        let entries = self.proxies.get(namespace).ok_or_else(|| {
            anyhow!("No deploy data found for {namespace}. Was the contract deployed?")
        })?;
        entries.get(index).map(|entry| entry.address).ok_or_else(|| {
            anyhow!("No deploy data found for {namespace} at index {index}. Was the contract deployed?")
        })
    }
}
