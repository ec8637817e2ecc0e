//! Phase orchestration.

use crate::{
    cli::{Command, MigrateCli, TokensArgs},
    config::{AccountsFile, DeployData, CARD_LIBRARY, CONTROLLER, TOKEN_MIGRATOR},
};
use alloy_primitives::{utils::format_ether, Address};
use anyhow::{anyhow, Result};
use cards_migrator::{
    distribute_initial_gum, migrate_gum_holders, migrate_pack_purchases, CardLibrary,
    DriverConfig, GasPriceOracle, GumMigrator, MigrationDriver, MigrationStateStore, StateLock,
    SubmissionContext, TokenKind, TokenMigrator, GWEI,
};
use cards_providers_alloy::AlloyMigrator;
use rand::{rngs::StdRng, SeedableRng};
use std::{future::Future, path::Path};
use tracing::{info, warn};

/// What the `tokens` phase runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokensPlan {
    /// Token families to migrate, in order.
    pub kinds: Vec<TokenKind>,
    /// Maximum passes per family.
    pub passes: u64,
    /// Driver tunables.
    pub driver: DriverConfig,
    /// Seed for the gum yield draw.
    pub gum_seed: Option<u64>,
    /// Controller to restore after replaying purchased pack counters, if that step runs.
    pub purchases_controller: Option<Address>,
}

impl TokensPlan {
    /// Builds the plan from the command line.
    pub fn new(args: &TokensArgs, purchases_controller: Option<Address>) -> Result<Self> {
        Ok(Self {
            kinds: args.kinds(),
            passes: args.passes,
            driver: args.driver_config()?,
            gum_seed: args.gum_seed,
            purchases_controller,
        })
    }
}

/// Runs the selected phase against the configured network.
pub async fn run(cli: MigrateCli) -> Result<()> {
    let tokens = match &cli.command {
        Command::Unlock { force } => return unlock(&cli.state_path(), *force),
        Command::Gum => None,
        Command::Tokens(args) => Some(args),
    };

    // Everything read from disk is checked before the first transaction.
    let rpc_url = cli.rpc_url()?;
    let accounts = AccountsFile::load(&cli.accounts)?;
    let deploy = DeployData::load(&cli.deploy_data_path())?;
    let provider = AlloyMigrator::new_http(
        rpc_url,
        deploy.address_of(TOKEN_MIGRATOR, 0)?,
        deploy.address_of(CARD_LIBRARY, 0)?,
    );
    let plan = match tokens {
        None => None,
        Some(args) => {
            let controller =
                args.purchased_packs.then(|| deploy.address_of(CONTROLLER, 0)).transpose()?;
            Some(TokensPlan::new(args, controller)?)
        }
    };

    let (min, max) = cli.gas_price_bounds();
    info!(target: "migrate", "Network: {}", cli.network);
    info!(target: "migrate", "Chain ID: {}", provider.chain_id().await?);
    info!(target: "migrate", "Max gas price: {} gwei", max / GWEI);
    info!(target: "migrate", "Owner: {}", cli.owner);

    let mut ctx =
        SubmissionContext::from_chain(&provider, cli.owner, GasPriceOracle::new(min, max)).await?;
    match plan {
        None => run_gum(&provider, &mut ctx, &accounts.erc20).await?,
        Some(plan) => {
            run_tokens(&provider, &mut ctx, &plan, &accounts, &cli.state_path()).await?
        }
    }

    log_totals(&ctx);
    Ok(())
}

/// Drives `task` to completion unless `interrupt` fires first.
///
/// On interrupt `task` is dropped, which releases the state lock it holds. Tokens picked up but
/// not yet saved are retried by the next run.
pub async fn run_until_interrupted<F, S>(task: F, interrupt: S) -> Result<()>
where
    F: Future<Output = Result<()>>,
    S: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        biased;
        result = task => result,
        signal = interrupt => {
            signal?;
            warn!(target: "migrate", "Interrupted, stopping the migration");
            Err(anyhow!("Migration interrupted"))
        }
    }
}

/// Removes the lock left on the state file by an interrupted run.
pub fn unlock(state_path: &Path, force: bool) -> Result<()> {
    if StateLock::unlock(state_path, force)? {
        info!(target: "migrate", "Removed the lock on {}", state_path.display());
    } else {
        info!(target: "migrate", "No lock held on {}", state_path.display());
    }
    Ok(())
}

/// Migrates gum holders and distributes the initial reserve.
pub async fn run_gum<P>(provider: &P, ctx: &mut SubmissionContext, holders: &[Address]) -> Result<()>
where
    P: GumMigrator + Sync,
{
    migrate_gum_holders(provider, ctx, holders).await?;
    distribute_initial_gum(provider, ctx).await?;
    info!(target: "migrate", "ERC20 token migration complete");
    Ok(())
}

/// Runs the driver for every selected token family, then replays purchased pack counters.
///
/// The state file is locked while the driver runs.
pub async fn run_tokens<P>(
    provider: &P,
    ctx: &mut SubmissionContext,
    plan: &TokensPlan,
    accounts: &AccountsFile,
    state_path: &Path,
) -> Result<()>
where
    P: TokenMigrator + CardLibrary + Sync,
{
    if !plan.kinds.is_empty() {
        let lock = StateLock::acquire(state_path)?;
        let mut store = MigrationStateStore::load(state_path)?;
        let rng = plan.gum_seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut driver = MigrationDriver::new(provider, ctx, &mut store, plan.driver.clone(), rng);

        for &kind in &plan.kinds {
            for pass in 1..=plan.passes {
                info!(target: "migrate", "Migrating {kind}, pass {pass} of {}", plan.passes);
                let summary = driver.migrate(kind, &accounts.erc721).await?;
                if !summary.made_progress() {
                    info!(target: "migrate", "No {kind} left to migrate");
                    break;
                }
            }
        }
        drop(driver);
        lock.release()?;
    }

    if let Some(controller) = plan.purchases_controller {
        migrate_pack_purchases(provider, ctx, controller, &accounts.pack_purchasers).await?;
    }
    info!(target: "migrate", "ERC721 token migration complete");
    Ok(())
}

/// Logs the gas spent over the run.
pub fn log_totals(ctx: &SubmissionContext) {
    info!(target: "migrate", "Transactions: {}", ctx.transactions());
    info!(target: "migrate", "Total Gas Used: {}", ctx.total_gas());
    info!(target: "migrate", "Total Cost: {} ETH", format_ether(ctx.total_cost()));
}
