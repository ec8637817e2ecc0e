#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod errors;
pub use errors::{MigrationError, MigrationResult, StateError};

mod types;
pub use types::{GasPrice, ReceiptLog, TokenKind, TxParams, TxReceipt};

mod traits;
pub use traits::{CardLibrary, ChainClient, GumMigrator, TokenMigrator};

mod state;
pub use state::{KindState, MigrationState, MigrationStateStore};

mod lock;
pub use lock::{LockMeta, StateLock};

mod gas;
pub use gas::{GasPriceOracle, GWEI};

mod context;
pub use context::SubmissionContext;

mod driver;
pub use driver::{
    AccountOutcome, BatchStats, DecodeMode, DriverConfig, MigrationDriver, PassSummary,
    DEFAULT_BATCH_SIZE, DEFAULT_GUM_RANGE,
};

mod gum;
pub use gum::{distribute_initial_gum, migrate_gum_holders, GumMigration, GUM_DECIMALS};

mod purchases;
pub use purchases::{migrate_pack_purchases, PackPurchase};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
