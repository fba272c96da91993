//! history.rs — append-only check-in history and per-user trend.
//!
//! The medium sits behind [`HistoryStore`]: [`JsonlHistoryStore`] keeps one JSON
//! record per line on disk, [`MemoryHistoryStore`] keeps them in process.
//! [`HistoryTracker`] serializes read-then-append so concurrent check-ins never
//! lose records, and computes the trend over the result.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::score::Level;
use crate::sentiment::SentimentClass;

/// A change larger than this (in score points) between the two latest
/// check-ins counts as rising/falling.
pub const TREND_DELTA: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "usuario_id")]
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    #[serde(rename = "nivel")]
    pub level: Level,
    #[serde(rename = "sentimento")]
    pub sentiment: SentimentClass,
}

impl HistoryRecord {
    /// Record stamped with the current UTC time.
    pub fn now(user_id: &str, score: f64, level: Level, sentiment: SentimentClass) -> Self {
        Self {
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            score,
            level,
            sentiment,
        }
    }
}

/// Direction of change between a user's two most recent scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "subindo")]
    Rising,
    #[serde(rename = "caindo")]
    Falling,
    #[serde(rename = "estavel")]
    Stable,
    #[serde(rename = "primeira_medicao")]
    FirstMeasurement,
}

impl Trend {
    pub fn from_delta(delta: f64) -> Self {
        if delta > TREND_DELTA {
            Trend::Rising
        } else if delta < -TREND_DELTA {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Rising => "subindo",
            Trend::Falling => "caindo",
            Trend::Stable => "estavel",
            Trend::FirstMeasurement => "primeira_medicao",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: Trend,
    /// Check-ins on record for the user, including the current one.
    pub total: usize,
}

/// Durable, insertion-ordered, append-only record log.
pub trait HistoryStore: Send + Sync {
    /// All records in insertion order.
    fn load_all(&self) -> Result<Vec<HistoryRecord>, StoreError>;
    /// Append one record. Must not rewrite existing ones.
    fn append(&self, record: &HistoryRecord) -> Result<(), StoreError>;
}

/// JSON Lines file; each append opens the file in append mode and writes one line.
///
/// Reads skip lines that do not parse (e.g. a record torn by a crash) so one
/// bad line never hides the rest of the log.
#[derive(Debug, Clone)]
pub struct JsonlHistoryStore {
    path: PathBuf,
}

impl JsonlHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonlHistoryStore {
    fn load_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut out = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(&line) {
                Ok(rec) => out.push(rec),
                Err(source) => {
                    let err = StoreError::Corrupt { line: i + 1, source };
                    counter!("ritmo_history_read_failures_total").increment(1);
                    warn!(target: "ritmo", error = %err, "skipping corrupt history line");
                }
            }
        }
        Ok(out)
    }

    fn append(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut f = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        // A torn last line (no trailing newline) must not swallow this record.
        let len = f.metadata()?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            f.seek(SeekFrom::Start(len - 1))?;
            f.read_exact(&mut last)?;
            if last[0] != b'\n' {
                line.insert(0, '\n');
            }
        }
        f.write_all(line.as_bytes())?;
        f.sync_data()?;
        Ok(())
    }
}

/// In-process store. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        let v = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Ok(v.clone())
    }

    fn append(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        let mut v = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        v.push(record.clone());
        Ok(())
    }
}

/// Owns the store and the read-then-append critical section.
pub struct HistoryTracker {
    store: Arc<dyn HistoryStore>,
    gate: Mutex<()>,
}

impl std::fmt::Debug for HistoryTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryTracker").finish_non_exhaustive()
    }
}

impl HistoryTracker {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryHistoryStore::new()))
    }

    pub fn jsonl(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonlHistoryStore::new(path)))
    }

    /// Append the current check-in and return the user's trend including it.
    ///
    /// An unreadable store is treated as empty history (corrupt lines are
    /// skipped by the store itself); a failed append is returned as an error.
    pub fn record_and_get_trend(
        &self,
        user_id: &str,
        score: f64,
        level: Level,
        sentiment: SentimentClass,
    ) -> Result<TrendResult, StoreError> {
        // Guard protects no data, so a poisoned lock is safe to reuse.
        let _guard = self.gate.lock().unwrap_or_else(|p| p.into_inner());

        let mut records = self.load_best_effort();
        let mut record = HistoryRecord::now(user_id, score, level, sentiment);
        // Wall clock may step back; the new record must still sort last.
        if let Some(last) = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.timestamp)
            .max()
        {
            record.timestamp = record.timestamp.max(last);
        }

        if let Err(e) = self.store.append(&record) {
            counter!("ritmo_history_write_failures_total").increment(1);
            warn!(target: "ritmo", error = %e, "history append failed");
            return Err(e);
        }
        records.push(record);

        let res = trend_for(&records, user_id);
        debug!(target: "ritmo", trend = res.trend.as_str(), total = res.total, "trend computed");
        Ok(res)
    }

    /// A user's records in timestamp order (best-effort read).
    pub fn records_for(&self, user_id: &str) -> Vec<HistoryRecord> {
        let records = self.load_best_effort();
        let mut mine: Vec<HistoryRecord> =
            records.into_iter().filter(|r| r.user_id == user_id).collect();
        mine.sort_by_key(|r| r.timestamp);
        mine
    }

    fn load_best_effort(&self) -> Vec<HistoryRecord> {
        match self.store.load_all() {
            Ok(v) => v,
            Err(e) => {
                counter!("ritmo_history_read_failures_total").increment(1);
                warn!(target: "ritmo", error = %e, "history unreadable; treating as empty");
                Vec::new()
            }
        }
    }
}

/// Trend for `user_id` over `records` (any order; stable-sorted by timestamp).
pub fn trend_for(records: &[HistoryRecord], user_id: &str) -> TrendResult {
    let mut mine: Vec<&HistoryRecord> = records.iter().filter(|r| r.user_id == user_id).collect();
    mine.sort_by_key(|r| r.timestamp);

    let total = mine.len();
    if total <= 1 {
        return TrendResult {
            trend: Trend::FirstMeasurement,
            total,
        };
    }

    let latest = mine[total - 1].score;
    let previous = mine[total - 2].score;
    TrendResult {
        trend: Trend::from_delta(latest - previous),
        total,
    }
}
