//! Persisted migration progress.

use crate::{StateError, TokenKind};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Progress for one token family.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindState {
    /// Next batch index to process, per holder.
    #[serde(default)]
    pub batch_progress: BTreeMap<Address, u64>,
    /// Legacy token ids that have been picked up by a previous batch.
    #[serde(default)]
    pub completed: BTreeSet<U256>,
}

/// The full migration state: one [KindState] per [TokenKind].
///
/// Unknown fields are rejected, so a state file of another shape fails to load instead of
/// resetting every holder's progress.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationState {
    /// Pack progress.
    #[serde(default)]
    pub packs: KindState,
    /// Card progress.
    #[serde(default)]
    pub cards: KindState,
}

impl MigrationState {
    /// Returns the progress for the given token family.
    pub const fn kind(&self, kind: TokenKind) -> &KindState {
        match kind {
            TokenKind::Packs => &self.packs,
            TokenKind::Cards => &self.cards,
        }
    }

    /// Returns the mutable progress for the given token family.
    pub fn kind_mut(&mut self, kind: TokenKind) -> &mut KindState {
        match kind {
            TokenKind::Packs => &mut self.packs,
            TokenKind::Cards => &mut self.cards,
        }
    }
}

/// A [MigrationState] bound to its JSON file.
///
/// Mutations only touch memory; [MigrationStateStore::save] writes the whole state back. The
/// file is replaced through a synced temporary sibling so a crash mid-write leaves the previous
/// state intact. An existing file that is empty or unparsable is [StateError::Corrupt].
#[derive(Debug)]
pub struct MigrationStateStore {
    path: PathBuf,
    state: MigrationState,
}

impl MigrationStateStore {
    /// Loads the state at `path`, writing an empty state first if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        if !path.exists() {
            info!(target: "state", "Creating migration state at {}", path.display());
            let store = Self { path, state: MigrationState::default() };
            store.save()?;
            return Ok(store);
        }

        let raw = fs::read_to_string(&path).map_err(|e| StateError::io(&path, e))?;
        let state: MigrationState = serde_json::from_str(&raw)
            .map_err(|source| StateError::Corrupt { path: path.clone(), source })?;
        debug!(
            target: "state",
            "Loaded migration state: {} packs and {} cards completed",
            state.packs.completed.len(),
            state.cards.completed.len()
        );
        Ok(Self { path, state })
    }

    /// Creates a store over an in-memory state without touching the file system.
    pub const fn with_state(path: PathBuf, state: MigrationState) -> Self {
        Self { path, state }
    }

    /// Writes the state to disk.
    pub fn save(&self) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }
        let serialized = serde_json::to_string_pretty(&self.state)
            .map_err(|source| StateError::Corrupt { path: self.path.clone(), source })?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| StateError::io(&tmp, e))?;
        file.write_all(serialized.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StateError::io(&tmp, e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| StateError::io(&self.path, e))?;
        sync_parent_dir(&self.path).map_err(|e| StateError::io(&self.path, e))
    }

    /// Returns the path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the in-memory state.
    pub const fn state(&self) -> &MigrationState {
        &self.state
    }

    /// Returns the next batch index for `account`, or 0 if none was recorded.
    pub fn batch_pass(&self, kind: TokenKind, account: Address) -> u64 {
        self.state.kind(kind).batch_progress.get(&account).copied().unwrap_or_default()
    }

    /// Records the next batch index for `account`.
    ///
    /// Progress never moves backwards; a lower value than the recorded one is ignored.
    pub fn set_batch_pass(&mut self, kind: TokenKind, account: Address, pass: u64) {
        let entry = self.state.kind_mut(kind).batch_progress.entry(account).or_default();
        *entry = (*entry).max(pass);
    }

    /// Returns `true` if the legacy token has already been picked up.
    pub fn is_migrated(&self, kind: TokenKind, token_id: U256) -> bool {
        self.state.kind(kind).completed.contains(&token_id)
    }

    /// Marks the legacy token as picked up.
    pub fn mark_migrated(&mut self, kind: TokenKind, token_id: U256) {
        self.state.kind_mut(kind).completed.insert(token_id);
    }
}

/// Flushes the directory entry of a freshly renamed file.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
const fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
