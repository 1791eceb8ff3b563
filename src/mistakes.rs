use serde::{Deserialize, Serialize};

use crate::app_dirs::AppDirs;
use crate::error::VocquizError;
use crate::storage::{JsonFileStore, MemoryStore, SnapshotStore};

/// One incorrectly answered (word, translation) pair.
///
/// Field names serialize as camelCase so the on-disk log matches the records
/// written by earlier versions of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeEntry {
    pub word: String,
    pub translation: String,
    /// Level that was active when the mistake first occurred.
    pub level: String,
    pub miss_count: u32,
}

/// Log of missed words, deduplicated by (word, translation).
///
/// Entries keep insertion order. Every mutation persists the whole log
/// through the snapshot store before returning; a failed write leaves the
/// in-memory log authoritative and is reported via [`MistakeLog::persist_error`].
pub struct MistakeLog {
    entries: Vec<MistakeEntry>,
    store: Box<dyn SnapshotStore<Vec<MistakeEntry>>>,
    persist_error: Option<String>,
}

impl MistakeLog {
    /// Open the log backed by the default state-dir file, hydrating any
    /// previously persisted entries. Falls back to an in-memory store when no
    /// state directory can be resolved.
    pub fn open() -> Self {
        match AppDirs::mistakes_path() {
            Some(path) => Self::with_store(Box::new(JsonFileStore::new(path))),
            None => Self::with_store(Box::new(MemoryStore::new())),
        }
    }

    pub fn with_store(store: Box<dyn SnapshotStore<Vec<MistakeEntry>>>) -> Self {
        let entries = store.load();
        Self {
            entries,
            store,
            persist_error: None,
        }
    }

    /// Record a miss. A repeated (word, translation) pair increments the
    /// existing entry's counter and leaves its level untouched; a new pair is
    /// appended with a count of 1.
    pub fn add(&mut self, word: &str, translation: &str, level: &str) -> Result<(), VocquizError> {
        if word.is_empty() || translation.is_empty() || level.is_empty() {
            return Err(VocquizError::InvalidArgument(
                "mistake word, translation, and level must be non-empty".into(),
            ));
        }

        match self
            .entries
            .iter_mut()
            .find(|e| e.word == word && e.translation == translation)
        {
            Some(entry) => entry.miss_count += 1,
            None => self.entries.push(MistakeEntry {
                word: word.to_string(),
                translation: translation.to_string(),
                level: level.to_string(),
                miss_count: 1,
            }),
        }

        self.persist();
        Ok(())
    }

    /// Drop every entry. Idempotent.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[MistakeEntry] {
        &self.entries
    }

    /// Entries restricted to one level, or all of them when `level` is None.
    pub fn for_level(&self, level: Option<&str>) -> Vec<&MistakeEntry> {
        self.entries
            .iter()
            .filter(|e| level.is_none_or(|l| e.level == l))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct levels present in the log, in first-seen order. Drives the
    /// review screen's filter cycling.
    pub fn levels(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.level.as_str()) {
                seen.push(entry.level.as_str());
            }
        }
        seen
    }

    /// Last persistence failure, if the most recent mutation could not be
    /// written to disk.
    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    fn persist(&mut self) {
        match self.store.save(&self.entries) {
            Ok(()) => self.persist_error = None,
            Err(e) => self.persist_error = Some(e.to_string()),
        }
    }
}
