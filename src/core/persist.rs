//! Persistence port for state that outlives a process.
//!
//! The core never reaches for a global store; callers inject a [`StatePort`].
//! Two stores ship: an in-memory map for tests and embedding, and a JSON file
//! store for the CLI.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::bookmarks::BookmarkStore;
use crate::core::source::SourceMeta;
use crate::infra::utils::SizeUtils;

/// Most recent files kept in history.
pub const HISTORY_LIMIT: usize = 5;

const HISTORY_KEY: &str = "recent_files";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("state store I/O at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state store JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state store lock poisoned")]
    Poisoned,
}

/// Key-value persistence injected into the core.
pub trait StatePort: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatePort for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let map = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut map = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut map = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

/// All keys in a single JSON object file, rewritten atomically on save.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write within this process
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PersistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), PersistError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let json = serde_json::to_string_pretty(map)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(path = %self.path.display(), keys = map.len(), "state store written");
        Ok(())
    }
}

impl StatePort for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let _g = self.guard.lock().map_err(|_| PersistError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let _g = self.guard.lock().map_err(|_| PersistError::Poisoned)?;
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let _g = self.guard.lock().map_err(|_| PersistError::Poisoned)?;
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

/// One entry of the recently-opened list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFile {
    pub name: String,
    /// Human-readable size, e.g. `1.5 MB`.
    pub size: String,
    /// Day the file was opened, `YYYY-MM-DD`.
    pub date: String,
}

impl RecentFile {
    pub fn new(meta: &SourceMeta, opened: NaiveDate) -> Self {
        Self {
            name: meta.name.clone(),
            size: SizeUtils::format_bytes(meta.size),
            date: opened.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Recently opened files, most recent first.
pub fn load_history(port: &dyn StatePort) -> Result<Vec<RecentFile>, PersistError> {
    match port.load(HISTORY_KEY)? {
        None => Ok(Vec::new()),
        Some(text) => match serde_json::from_str(&text) {
            Ok(list) => Ok(list),
            Err(e) => {
                // A corrupt history should not block opening files
                warn!(error = %e, "discarding unreadable history");
                Ok(Vec::new())
            }
        },
    }
}

/// Puts `entry` at the head of the history, dropping any older entry with
/// the same name, and caps the list at [`HISTORY_LIMIT`].
pub fn record_history(
    port: &dyn StatePort,
    entry: RecentFile,
) -> Result<Vec<RecentFile>, PersistError> {
    let mut list = load_history(port)?;
    list.retain(|h| h.name != entry.name);
    list.insert(0, entry);
    list.truncate(HISTORY_LIMIT);

    port.save(HISTORY_KEY, &serde_json::to_string(&list)?)?;
    Ok(list)
}

pub fn clear_history(port: &dyn StatePort) -> Result<(), PersistError> {
    port.remove(HISTORY_KEY)
}

fn bookmarks_key(source_name: &str) -> String {
    format!("bookmarks:{source_name}")
}

/// Saves a bookmark snapshot for a source; an empty store removes it.
pub fn save_bookmarks(
    port: &dyn StatePort,
    source_name: &str,
    store: &BookmarkStore,
) -> Result<(), PersistError> {
    let key = bookmarks_key(source_name);
    if store.is_empty() {
        return port.remove(&key);
    }
    port.save(&key, &serde_json::to_string(store)?)
}

pub fn load_bookmarks(
    port: &dyn StatePort,
    source_name: &str,
) -> Result<Option<BookmarkStore>, PersistError> {
    port.load(&bookmarks_key(source_name))?
        .map(|text| serde_json::from_str(&text).map_err(PersistError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn meta(name: &str, size: u64) -> SourceMeta {
        SourceMeta {
            name: name.into(),
            size,
        }
    }

    #[test]
    fn history_is_capped_and_most_recent_first() {
        let store = MemoryStore::new();
        for i in 0..7 {
            record_history(&store, RecentFile::new(&meta(&format!("f{i}.log"), 10), day(1))).unwrap();
        }
        let names: Vec<_> = load_history(&store).unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["f6.log", "f5.log", "f4.log", "f3.log", "f2.log"]);
    }

    #[test]
    fn reopening_moves_entry_to_front() {
        let store = MemoryStore::new();
        record_history(&store, RecentFile::new(&meta("a.log", 1), day(1))).unwrap();
        record_history(&store, RecentFile::new(&meta("b.log", 1), day(2))).unwrap();
        let list = record_history(&store, RecentFile::new(&meta("a.log", 2048), day(3))).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "a.log");
        assert_eq!(list[0].size, "2 KB");
        assert_eq!(list[0].date, "2026-10-03");
        assert_eq!(list[1].name, "b.log");
    }

    #[test]
    fn corrupt_history_reads_as_empty() {
        let store = MemoryStore::new();
        store.save(HISTORY_KEY, "not json").unwrap();
        assert!(load_history(&store).unwrap().is_empty());
    }

    #[test]
    fn json_file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/state.json"));
        assert_eq!(store.load("k").unwrap(), None);

        store.save("k", "v").unwrap();
        store.save("other", "w").unwrap();
        let reopened = JsonFileStore::new(store.path());
        assert_eq!(reopened.load("k").unwrap().as_deref(), Some("v"));

        reopened.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
        assert_eq!(store.load("other").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn bookmark_snapshots_are_per_source() {
        let store = MemoryStore::new();
        let mut marks = BookmarkStore::new();
        marks.toggle(12, "hello", 0);

        save_bookmarks(&store, "a.log", &marks).unwrap();
        assert_eq!(load_bookmarks(&store, "a.log").unwrap(), Some(marks));
        assert_eq!(load_bookmarks(&store, "b.log").unwrap(), None);

        save_bookmarks(&store, "a.log", &BookmarkStore::new()).unwrap();
        assert_eq!(load_bookmarks(&store, "a.log").unwrap(), None);
    }
}
