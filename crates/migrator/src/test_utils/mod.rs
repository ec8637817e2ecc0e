//! Test utilities for `cards-migrator`.

mod chain;
pub use chain::{TestChain, TestChainError, MINT_GAS, TX_GAS};

mod tracing;
pub use tracing::{CollectingLayer, TraceStorage};
