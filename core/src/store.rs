use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

use crate::history::History;

/// Whole-document persistence for the ledger history.
///
/// `save` always receives the complete serialized state and replaces
/// whatever the store held before (last write wins); there are no partial
/// writes. `load` on a store that has never been written returns an empty
/// history, not an error. Implementations may fail for any reason; the
/// ledger maps failures to [`crate::error::LedgerError::Unavailable`] and
/// keeps its in-memory state authoritative.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<History>;
    fn save(&self, history: &History) -> Result<()>;
}

/// Flat-file store: the whole history as one pretty-printed JSON document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<History> {
        if !self.path.exists() {
            return Ok(History::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read history file {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(History::default());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse history file {}", self.path.display()))
    }

    fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(history).context("failed to serialize history")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write history file {}", self.path.display()))
    }
}

/// In-memory store for tests and for embedding without a filesystem.
/// Clones share the same document, so a test can hand one handle to the
/// ledger and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The serialized document from the last save, if any.
    #[must_use]
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<History> {
        let document = self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match document.as_deref() {
            Some(json) => serde_json::from_str(json).context("failed to parse stored history"),
            None => Ok(History::default()),
        }
    }

    fn save(&self, history: &History) -> Result<()> {
        let json = serde_json::to_string_pretty(history).context("failed to serialize history")?;
        *self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }
}
