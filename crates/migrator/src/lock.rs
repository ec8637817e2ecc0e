//! Advisory lock guarding a migration state file against concurrent runs.

use crate::StateError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Metadata written into the lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMeta {
    /// Process holding the lock.
    pub pid: u32,
    /// Version of the migration tool holding the lock.
    pub version: String,
}

/// An exclusive lock on a state file, held as `<state>.lock` next to it.
///
/// The lock file is created with `create_new`, so acquisition fails fast if another process
/// holds it. It is removed on [StateLock::release] or drop. A lock whose recorded process has
/// exited is reclaimed on the next [StateLock::acquire]; any other leftover lock is removed with
/// [StateLock::unlock].
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
    released: bool,
}

/// Whether the process recorded in a lock file is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(unix), allow(dead_code))]
enum HolderState {
    Alive,
    Exited,
    Unknown,
}

impl StateLock {
    /// Returns the lock file path for a state file.
    pub fn lock_path(state_path: &Path) -> PathBuf {
        let mut name = state_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".lock");
        state_path.with_file_name(name)
    }

    /// Acquires the lock for `state_path`.
    pub fn acquire(state_path: &Path) -> Result<Self, StateError> {
        let path = Self::lock_path(state_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }

        let mut file = match create_lock_file(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let holder = read_meta(&path).map(|meta| meta.pid);
                if holder.map(holder_state) != Some(HolderState::Exited) {
                    return Err(StateError::Locked { path, holder });
                }
                warn!(
                    target: "state",
                    "Reclaiming state lock {} left by exited process {}",
                    path.display(),
                    holder.unwrap_or_default()
                );
                fs::remove_file(&path).map_err(|e| StateError::io(&path, e))?;
                create_lock_file(&path).map_err(|e| locked_or_io(path.clone(), e))?
            }
            Err(e) => return Err(StateError::io(path, e)),
        };

        let meta = LockMeta { pid: std::process::id(), version: env!("CARGO_PKG_VERSION").into() };
        let write = serde_json::to_vec(&meta)
            .map_err(io::Error::other)
            .and_then(|bytes| file.write_all(&bytes))
            .and_then(|_| file.sync_all());
        if let Err(e) = write {
            let _ = fs::remove_file(&path);
            return Err(StateError::io(path, e));
        }

        debug!(target: "state", "Acquired state lock {}", path.display());
        Ok(Self { path, released: false })
    }

    /// Removes the lock left behind on `state_path` by an interrupted run.
    ///
    /// A lock whose holder is still running, or cannot be identified, is only removed with
    /// `force`. Returns `false` if there was no lock.
    pub fn unlock(state_path: &Path, force: bool) -> Result<bool, StateError> {
        let path = Self::lock_path(state_path);
        if !path.exists() {
            return Ok(false);
        }

        let holder = read_meta(&path).map(|meta| meta.pid);
        if !force && holder.map(holder_state) != Some(HolderState::Exited) {
            return Err(StateError::Locked { path, holder });
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                warn!(target: "state", "Removed state lock {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StateError::io(path, e)),
        }
    }

    /// Returns the lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the lock, removing the lock file.
    pub fn release(mut self) -> Result<(), StateError> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| StateError::io(&self.path, e))
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(target: "state", "Failed to remove state lock {}: {e}", self.path.display());
            }
        }
    }
}

fn create_lock_file(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}

fn locked_or_io(path: PathBuf, e: io::Error) -> StateError {
    if e.kind() == io::ErrorKind::AlreadyExists {
        let holder = read_meta(&path).map(|meta| meta.pid);
        StateError::Locked { path, holder }
    } else {
        StateError::io(path, e)
    }
}

fn read_meta(path: &Path) -> Option<LockMeta> {
    let bytes = fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Probes `pid` with signal 0.
#[cfg(unix)]
fn holder_state(pid: u32) -> HolderState {
    use nix::{errno::Errno, sys::signal::kill, unistd::Pid};

    let pid = match i32::try_from(pid) {
        Ok(pid) if pid > 0 => pid,
        _ => return HolderState::Unknown,
    };
    match kill(Pid::from_raw(pid), None) {
        Ok(()) | Err(Errno::EPERM) => HolderState::Alive,
        Err(Errno::ESRCH) => HolderState::Exited,
        Err(_) => HolderState::Unknown,
    }
}

#[cfg(not(unix))]
const fn holder_state(_pid: u32) -> HolderState {
    HolderState::Unknown
}
