//! Error types for the `cards-migrator` crate.

use alloy_primitives::{B256, U256};
use cards_codec::CodecError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// A [Result] type for the [MigrationError].
pub type MigrationResult<T, E> = Result<T, MigrationError<E>>;

/// An error raised by a migration phase.
#[derive(Error, Debug)]
pub enum MigrationError<E>
where
    E: core::error::Error,
{
    /// A contract call or transaction failed.
    #[error("Provider error: {0}")]
    Provider(E),
    /// A token could not be converted.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    /// The migration state could not be read or written.
    #[error("State error: {0}")]
    State(#[from] StateError),
    /// A value returned by the contract does not fit a native integer.
    #[error("{what} {value} does not fit a native integer")]
    Overflow {
        /// What the value describes.
        what: &'static str,
        /// The returned value.
        value: U256,
    },
    /// A transaction was mined but reverted.
    #[error("Transaction {0} reverted")]
    Reverted(B256),
    /// The driver was configured with unusable parameters.
    #[error("Invalid driver configuration: {0}")]
    Config(&'static str),
}

/// An error raised by the [MigrationStateStore] or the [StateLock].
///
/// [MigrationStateStore]: crate::MigrationStateStore
/// [StateLock]: crate::StateLock
#[derive(Error, Debug)]
pub enum StateError {
    /// Reading or writing the state file failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The state file is not valid JSON for the state schema.
    #[error("Corrupt migration state at {path:?}: {source}")]
    Corrupt {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Another process holds the lock on the state file.
    #[error("Migration state {path:?} is locked by {}", describe_holder(.holder))]
    Locked {
        /// The lock file.
        path: PathBuf,
        /// Process id recorded in the lock file, if readable.
        holder: Option<u32>,
    },
}

fn describe_holder(holder: &Option<u32>) -> String {
    holder.map_or_else(|| "an unknown process".to_string(), |pid| format!("pid {pid}"))
}

impl StateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
