use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app_dirs::AppDirs;
use crate::error::VocquizError;
use crate::storage::{JsonFileStore, MemoryStore, SnapshotStore};
use crate::util::percentage;

/// Aggregated answer counters for one difficulty level.
///
/// `sum_time` serializes as `sumTime` to stay compatible with snapshots
/// written by earlier versions of the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStats {
    pub attempted: u64,
    pub correct: u64,
    /// Cumulative seconds from question display to answer submission.
    pub sum_time: f64,
}

/// Per-level answer statistics with derived correction-rate and timing
/// metrics.
///
/// A level's record is created lazily on its first recorded answer and only
/// ever mutated in place. Every mutation persists the whole store through the
/// snapshot store before returning; a failed write leaves the in-memory
/// state authoritative and is reported via [`StatsTracker::persist_error`].
pub struct StatsTracker {
    levels: BTreeMap<String, LevelStats>,
    store: Box<dyn SnapshotStore<BTreeMap<String, LevelStats>>>,
    persist_error: Option<String>,
}

impl StatsTracker {
    /// Open the tracker backed by the default state-dir file, hydrating any
    /// previously persisted counters. Falls back to an in-memory store when
    /// no state directory can be resolved.
    pub fn open() -> Self {
        match AppDirs::stats_path() {
            Some(path) => Self::with_store(Box::new(JsonFileStore::new(path))),
            None => Self::with_store(Box::new(MemoryStore::new())),
        }
    }

    pub fn with_store(store: Box<dyn SnapshotStore<BTreeMap<String, LevelStats>>>) -> Self {
        let levels = store.load();
        Self {
            levels,
            store,
            persist_error: None,
        }
    }

    /// Record one answered question for `level`.
    ///
    /// `time_spent_secs` is the elapsed time from question display to answer
    /// submission; it must be finite and non-negative so the aggregates can
    /// never be corrupted by a bad clock reading.
    pub fn record_answer(
        &mut self,
        level: &str,
        was_correct: bool,
        time_spent_secs: f64,
    ) -> Result<(), VocquizError> {
        if level.is_empty() {
            return Err(VocquizError::InvalidArgument(
                "level must be non-empty".into(),
            ));
        }
        if !time_spent_secs.is_finite() || time_spent_secs < 0.0 {
            return Err(VocquizError::InvalidArgument(format!(
                "time spent must be a non-negative number of seconds, got {time_spent_secs}"
            )));
        }

        let entry = self.levels.entry(level.to_string()).or_default();
        entry.attempted += 1;
        if was_correct {
            entry.correct += 1;
        }
        entry.sum_time += time_spent_secs;

        self.persist();
        Ok(())
    }

    /// Percentage of attempted answers at `level` that were correct, in
    /// [0, 100]. 0 for an unknown or zero-attempt level.
    pub fn correction_rate(&self, level: &str) -> f64 {
        match self.levels.get(level) {
            Some(s) => percentage(s.correct, s.attempted),
            None => 0.0,
        }
    }

    /// Average seconds per answer at `level`. 0 for an unknown or
    /// zero-attempt level.
    pub fn average_time(&self, level: &str) -> f64 {
        match self.levels.get(level) {
            Some(s) if s.attempted > 0 => s.sum_time / s.attempted as f64,
            _ => 0.0,
        }
    }

    pub fn attempted(&self, level: &str) -> u64 {
        self.levels.get(level).map_or(0, |s| s.attempted)
    }

    /// Average seconds per answer across every level in the store. 0 when
    /// nothing has been attempted anywhere.
    pub fn global_average_time(&self) -> f64 {
        let total_attempts: u64 = self.levels.values().map(|s| s.attempted).sum();
        if total_attempts == 0 {
            return 0.0;
        }
        let total_time: f64 = self.levels.values().map(|s| s.sum_time).sum();
        total_time / total_attempts as f64
    }

    /// Levels with recorded answers, with their counters, in key order.
    pub fn levels(&self) -> impl Iterator<Item = (&str, &LevelStats)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Last persistence failure, if the most recent mutation could not be
    /// written to disk.
    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    fn persist(&mut self) {
        match self.store.save(&self.levels) {
            Ok(()) => self.persist_error = None,
            Err(e) => self.persist_error = Some(e.to_string()),
        }
    }
}
