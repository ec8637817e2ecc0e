#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod cli;
pub use cli::{Command, MigrateCli, TokensArgs};

pub mod config;
pub use config::{AccountsFile, DeployData, Network, NetworkConfig};

mod telemetry;
pub use telemetry::{init_tracing_subscriber, verbosity_level};

pub mod run;
pub use run::{run, run_gum, run_tokens, run_until_interrupted, unlock, TokensPlan};
