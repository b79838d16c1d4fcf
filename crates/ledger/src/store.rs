#![forbid(unsafe_code)]

use crate::error::Error;
use crate::snapshot::LedgerSnapshot;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Durable backing for the ledger snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted snapshot, `None` when no durable state exists.
    fn load(&self) -> Result<Option<LedgerSnapshot>, Error>;
    /// Persist a snapshot.
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), Error>;
}

/// Store for ledgers that keep no durable state.
#[derive(Debug, Default)]
pub struct NoopStore;

impl SnapshotStore for NoopStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, Error> {
        Ok(None)
    }

    fn save(&self, _snapshot: &LedgerSnapshot) -> Result<(), Error> {
        Ok(())
    }
}

/// JSON file store with atomic replace: the snapshot is written to a
/// sibling temp file, synced, then renamed over the canonical path, so a
/// crash mid-write never corrupts the previous good copy.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let value = serde_json::from_str(&raw)?;
        Ok(Some(LedgerSnapshot::from_value(&value)))
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)?;
        file.write_all(serde_json::to_string_pretty(snapshot)?.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }
}
