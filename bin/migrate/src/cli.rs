//! Command line arguments.

use crate::config::Network;
use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use cards_migrator::{DecodeMode, DriverConfig, TokenKind, DEFAULT_BATCH_SIZE, GWEI};
use clap::{
    builder::styling::{AnsiColor, Color, Style},
    ArgAction, Args, Parser, Subcommand, ValueEnum,
};
use std::path::PathBuf;

/// Migrates Crypto-Cards token holders to the new contract generation.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, styles = cli_styles())]
pub struct MigrateCli {
    /// Verbosity level (0-2)
    #[arg(long, short, help = "Verbosity level (0 [info] - 2 [trace])", action = ArgAction::Count)]
    pub v: u8,
    /// Network to migrate on.
    #[arg(long, value_enum, env = "CCC_NETWORK", default_value_t = Network::Local)]
    pub network: Network,
    /// JSON-RPC endpoint. Defaults to the network's preset if it has one.
    #[arg(long, env = "CCC_RPC_URL")]
    pub rpc_url: Option<reqwest::Url>,
    /// Account sending every transaction. The node must hold it unlocked.
    #[arg(long, env = "CCC_OWNER_ACCOUNT")]
    pub owner: Address,
    /// JSON file listing the holders to migrate.
    #[arg(long, env = "CCC_ACCOUNTS_FILE", default_value = "accounts.json")]
    pub accounts: PathBuf,
    /// Deployment data with the contract addresses. Defaults to `zos.<network>.json`.
    #[arg(long, env = "CCC_DEPLOY_DATA")]
    pub deploy_data: Option<PathBuf>,
    /// Directory holding the migration state file.
    #[arg(long, env = "CCC_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,
    /// Gas price floor in gwei, overriding the network preset.
    #[arg(long)]
    pub min_gas_price: Option<u64>,
    /// Gas price ceiling in gwei, overriding the network preset.
    #[arg(long)]
    pub max_gas_price: Option<u64>,
    /// The migration phase to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Migration phases.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Migrate ERC20 gum balances and distribute the initial reserve.
    Gum,
    /// Migrate ERC721 packs and cards, and purchased pack counters.
    Tokens(TokensArgs),
    /// Remove the state lock left behind by an interrupted run.
    Unlock {
        /// Remove the lock even if its process still appears to be running.
        #[arg(long)]
        force: bool,
    },
}

/// Legacy card hash decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodeArg {
    /// Mask the fields out locally.
    Local,
    /// Ask the card library contract.
    Contract,
}

impl From<DecodeArg> for DecodeMode {
    fn from(arg: DecodeArg) -> Self {
        match arg {
            DecodeArg::Local => Self::Local,
            DecodeArg::Contract => Self::Contract,
        }
    }
}

/// Arguments of the `tokens` phase.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TokensArgs {
    /// Migrate packs.
    #[arg(long)]
    pub packs: bool,
    /// Migrate cards.
    #[arg(long)]
    pub cards: bool,
    /// Replay purchased pack counters.
    #[arg(long)]
    pub purchased_packs: bool,
    /// Tokens migrated per holder and batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,
    /// Batches to run per holder before exiting. Stops early once a pass finds no work.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub passes: u64,
    /// Where legacy card hashes are decoded.
    #[arg(long, value_enum, default_value_t = DecodeArg::Local)]
    pub decode: DecodeArg,
    /// Lowest gum yield assigned to a migrated card.
    #[arg(long, default_value_t = 15)]
    pub gum_min: u64,
    /// Highest gum yield assigned to a migrated card.
    #[arg(long, default_value_t = 30)]
    pub gum_max: u64,
    /// Seed for the gum yield draw. Random if omitted.
    #[arg(long)]
    pub gum_seed: Option<u64>,
}

impl TokensArgs {
    /// Returns the token families to migrate. Packs and cards both run if no phase is selected.
    pub fn kinds(&self) -> Vec<TokenKind> {
        let any_selected = self.packs || self.cards || self.purchased_packs;
        let mut kinds = Vec::new();
        if self.packs || !any_selected {
            kinds.push(TokenKind::Packs);
        }
        if self.cards || !any_selected {
            kinds.push(TokenKind::Cards);
        }
        kinds
    }

    /// Builds the driver configuration.
    pub fn driver_config(&self) -> Result<DriverConfig> {
        if self.gum_min > self.gum_max {
            return Err(anyhow!("--gum-min {} exceeds --gum-max {}", self.gum_min, self.gum_max));
        }
        Ok(DriverConfig {
            batch_size: self.batch_size,
            gum_range: self.gum_min..=self.gum_max,
            decode: self.decode.into(),
            ..Default::default()
        })
    }
}

impl MigrateCli {
    /// Returns the JSON-RPC endpoint, falling back to the network preset.
    pub fn rpc_url(&self) -> Result<reqwest::Url> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        let preset = self
            .network
            .config()
            .default_rpc_url
            .ok_or_else(|| anyhow!("--rpc-url is required on {}", self.network))?;
        Ok(preset.parse()?)
    }

    /// Returns the deployment data path.
    pub fn deploy_data_path(&self) -> PathBuf {
        self.deploy_data.clone().unwrap_or_else(|| self.network.deploy_data_file_name().into())
    }

    /// Returns the migration state file path.
    pub fn state_path(&self) -> PathBuf {
        self.state_dir.join(self.network.state_file_name())
    }

    /// Returns the gas price bounds in wei.
    pub fn gas_price_bounds(&self) -> (u128, u128) {
        let preset = self.network.config();
        let min = self.min_gas_price.map_or(preset.min_gas_price, |gwei| gwei as u128 * GWEI);
        let max = self.max_gas_price.map_or(preset.max_gas_price, |gwei| gwei as u128 * GWEI);
        (min, max)
    }
}

/// Styles for the CLI application.
const fn cli_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .header(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
