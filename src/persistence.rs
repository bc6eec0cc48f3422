// File: src/persistence.rs
use crate::core::dictionary::TranslationDictionary;
use crate::core::types::Language;
use crate::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A dictionary snapshot and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub dictionary: TranslationDictionary,
    /// Epoch milliseconds.
    pub fetched_at_ms: u64,
}

impl CacheRecord {
    pub fn is_fresh(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.fetched_at_ms) < window_ms
    }
}

/// Everything the overlay keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    pub language: Option<Language>,
    pub translation_url_prefix: Option<String>,
    pub translations: BTreeMap<Language, CacheRecord>,
    pub translation_enabled: Option<bool>,
    pub extension_enabled: Option<bool>,
    /// domain -> (miss key -> "")
    pub unmatched: BTreeMap<String, BTreeMap<String, String>>,
}

impl StoreState {
    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.translation_enabled.unwrap_or(true) && self.extension_enabled.unwrap_or(true)
    }
}

/// Typed local key-value store. Every mutation rewrites the whole file
/// atomically; there is no cross-process locking.
#[derive(Debug)]
pub struct LocalStore {
    path: Option<PathBuf>,
    state: StoreState,
}

impl LocalStore {
    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self { path: None, state: StoreState::default() }
    }

    /// Opens the store at `path`. A missing or unreadable file yields an empty
    /// store; the broken file is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = if path.exists() {
            load_from_disk(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "store unreadable, starting empty");
                StoreState::default()
            })
        } else {
            StoreState::default()
        };
        Self { path: Some(path), state }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Applies `f` and persists. Persistence failures are logged and swallowed;
    /// the in-memory state keeps the change either way.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let out = f(&mut self.state);
        if let Err(e) = self.save() {
            warn!(error = %e, "store write skipped");
        }
        out
    }

    /// Re-reads the file, picking up changes made by another process.
    pub fn reload(&mut self) {
        if let Some(path) = &self.path {
            match load_from_disk(path) {
                Ok(state) => self.state = state,
                Err(e) => debug!(error = %e, "store reload skipped"),
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_to_disk(&self.state, path),
            None => Ok(()),
        }
    }
}

pub fn save_to_disk(state: &StoreState, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, state)
            .map_err(|e| OverlayError::persistence(e.to_string()))?;
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .map_err(|e| OverlayError::persistence(e.to_string()))?;
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<StoreState> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    bincode::deserialize_from(reader).map_err(|e| OverlayError::persistence(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn freshness_window_is_exclusive() {
        let record = CacheRecord { dictionary: TranslationDictionary::new(), fetched_at_ms: 1_000 };
        assert!(record.is_fresh(1_000, 500));
        assert!(record.is_fresh(1_499, 500));
        assert!(!record.is_fresh(1_500, 500));
    }

    #[test]
    fn defaults_when_unset() {
        let state = StoreState::default();
        assert_eq!(state.language(), Language::Traditional);
        assert!(state.is_enabled());
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.bin");

        let mut store = LocalStore::open(&path);
        store.update(|s| {
            s.language = Some(Language::Simplified);
            s.extension_enabled = Some(false);
            s.unmatched.entry("wealthyexile.com".into()).or_default().insert("orb of #".into(), String::new());
        });

        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.state(), store.state());
        assert!(!reopened.state().is_enabled());
    }

    #[test]
    fn write_failure_keeps_in_memory_change() {
        let dir = tempdir().unwrap();
        // A directory where the store file should be: reads and writes both fail.
        let mut store = LocalStore::open(dir.path());
        store.update(|s| s.language = Some(Language::Simplified));

        assert_eq!(store.state().language, Some(Language::Simplified));
        assert!(store.save().is_err());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");
        fs::write(&path, b"\xff\xff\xff\xff not bincode").unwrap();
        let store = LocalStore::open(&path);
        assert_eq!(store.state(), &StoreState::default());
    }
}
