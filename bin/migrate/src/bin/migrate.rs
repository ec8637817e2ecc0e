//! Main entrypoint for the migration binary.

#![warn(missing_debug_implementations, missing_docs, unreachable_pub, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use anyhow::Result;
use cards_migrate::{init_tracing_subscriber, run, run_until_interrupted, MigrateCli};
use clap::Parser;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = MigrateCli::parse();
    init_tracing_subscriber(cli.v)?;

    run_until_interrupted(run(cli), tokio::signal::ctrl_c()).await?;
    info!(target: "migrate", "Exiting migration.");
    Ok(())
}
