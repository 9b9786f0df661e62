//! Persisted destination search history.
//!
//! Recent selections are kept most-recent-first, de-duplicated by label,
//! capped at [`HISTORY_CAP`] entries, and stored as a JSON array in the
//! data dir. A missing or unreadable file is the same as an empty history;
//! a failed write is logged and otherwise ignored.

use std::path::{Path, PathBuf};

use crate::model::types::SuggestItem;

pub const HISTORY_CAP: usize = 8;
pub const HISTORY_FILE: &str = "destination_history.json";

/// Storage seam for the autocomplete control. Injected rather than read
/// from ambient storage so tests can substitute [`MemoryHistory`].
pub trait HistoryStore {
    /// Current entries, most recent first.
    fn load(&self) -> Vec<SuggestItem>;

    /// Record a selection: drop any entry with the same label
    /// (case-sensitive), prepend, truncate to the cap, persist.
    fn record(&mut self, item: SuggestItem);
}

/// File-backed store at `<data dir>/destination_history.json`.
pub struct JsonHistoryStore {
    path: PathBuf,
    entries: Vec<SuggestItem>,
}

impl JsonHistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries }
    }

    pub fn open_default(data_dir: &Path) -> Self {
        Self::open(data_dir.join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget everything, on disk included. Used by `trips history --clear`.
    pub fn clear(&mut self) {
        self.entries.clear();
        if self.path.exists() {
            if let Err(err) = std::fs::remove_file(&self.path) {
                tracing::warn!("failed to remove history file: {err}");
            }
        }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(body) => {
                if let Err(err) = std::fs::write(&self.path, body) {
                    tracing::warn!("failed to persist destination history: {err}");
                }
            }
            Err(err) => tracing::warn!("failed to serialize destination history: {err}"),
        }
    }
}

fn read_entries(path: &Path) -> Vec<SuggestItem> {
    let mut entries: Vec<SuggestItem> = std::fs::read_to_string(path)
        .ok()
        .and_then(|body| serde_json::from_str(&body).ok())
        .unwrap_or_default();
    entries.truncate(HISTORY_CAP);
    entries
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Vec<SuggestItem> {
        self.entries.clone()
    }

    fn record(&mut self, item: SuggestItem) {
        push_front(&mut self.entries, item);
        self.persist();
    }
}

fn push_front(entries: &mut Vec<SuggestItem>, item: SuggestItem) {
    entries.retain(|e| e.label != item.label);
    entries.insert(0, item);
    entries.truncate(HISTORY_CAP);
}

/// In-memory store for tests and embedders without a data dir.
#[derive(Default)]
pub struct MemoryHistory {
    entries: Vec<SuggestItem>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(entries: Vec<SuggestItem>) -> Self {
        let mut store = Self { entries };
        store.entries.truncate(HISTORY_CAP);
        store
    }
}

impl HistoryStore for MemoryHistory {
    fn load(&self) -> Vec<SuggestItem> {
        self.entries.clone()
    }

    fn record(&mut self, item: SuggestItem) {
        push_front(&mut self.entries, item);
    }
}
