//! Persistent player state for MiniVegas
//!
//! Holds the key-value state that survives restarts: the coin balance and
//! the last-trigger timestamp of every cooldown gate. Loaded once at
//! startup, saved after every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the state document inside the data directory
pub const STATE_FILE: &str = "player_state.json";

/// The persisted document. Absent fields fall back to their defaults, so a
/// fresh install and a missing file behave the same: zero coins, every
/// gate never triggered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PlayerState {
    #[serde(default)]
    coins: u64,
    #[serde(default)]
    gates: BTreeMap<String, DateTime<Utc>>,
}

/// Process-wide persistent state store.
///
/// Every setter persists the new document before the in-memory state is
/// committed: a failed write leaves both disk and memory unchanged, so no
/// mutation ever partially applies.
pub struct StateStore {
    path: PathBuf,
    state: Mutex<PlayerState>,
}

impl StateStore {
    /// Open the store inside `data_dir`, creating the directory if needed.
    /// A missing state file yields the default state; a corrupt one is an
    /// error rather than a silent reset.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
        }
        let path = data_dir.join(STATE_FILE);

        let state = if path.exists() {
            serde_json::from_slice(&fs::read(&path)?)?
        } else {
            PlayerState::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn coins(&self) -> u64 {
        self.state.lock().coins
    }

    pub fn set_coins(&self, coins: u64) -> Result<()> {
        self.commit(|state| state.coins = coins)
    }

    /// Last successful trigger of a gate, or `None` for "never triggered".
    pub fn gate_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.state.lock().gates.get(key).copied()
    }

    pub fn set_gate_timestamp(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        self.commit(|state| {
            state.gates.insert(key.to_string(), at);
        })
    }

    /// Wipe everything back to the fresh-install state.
    pub fn clear(&self) -> Result<()> {
        self.commit(|state| *state = PlayerState::default())
    }

    /// Apply `mutate` to a copy of the state, persist the copy, then commit
    /// it. Persist-before-commit is what makes a failed save roll back.
    fn commit(&self, mutate: impl FnOnce(&mut PlayerState)) -> Result<()> {
        let mut guard = self.state.lock();
        let mut next = guard.clone();
        mutate(&mut next);
        self.write_file(&next)?;
        *guard = next;
        Ok(())
    }

    fn write_file(&self, state: &PlayerState) -> Result<()> {
        let data = serde_json::to_vec_pretty(state)?;

        // Write to temporary file first, then atomic rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, data)?;
        fs::rename(temp_path, &self.path)?;

        Ok(())
    }
}
