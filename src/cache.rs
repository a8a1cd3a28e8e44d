use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::binding::ResultRow;
use crate::domain::VisMode;
use crate::reshape::Visualization;

#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    pub rows: Option<Arc<Vec<ResultRow>>>,
    pub processed: Option<Arc<Visualization>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Entries only change through explicit stores or [`ModeCache::invalidate`];
/// nothing expires on its own. Writes to one mode never touch another, and
/// two writes to the same mode resolve last-write-wins.
#[derive(Debug, Default)]
pub struct ModeCache {
    entries: Mutex<HashMap<VisMode, CacheEntry>>,
}

impl ModeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, mode: VisMode) -> Option<Arc<Vec<ResultRow>>> {
        self.lock().get(&mode).and_then(|entry| entry.rows.clone())
    }

    pub fn processed(&self, mode: VisMode) -> Option<Arc<Visualization>> {
        self.lock()
            .get(&mode)
            .and_then(|entry| entry.processed.clone())
    }

    pub fn entry(&self, mode: VisMode) -> Option<CacheEntry> {
        self.lock().get(&mode).cloned()
    }

    pub fn store_rows(&self, mode: VisMode, rows: Arc<Vec<ResultRow>>) {
        let mut entries = self.lock();
        let entry = entries.entry(mode).or_default();
        entry.rows = Some(rows);
        entry.fetched_at = Some(Utc::now());
    }

    pub fn store_processed(&self, mode: VisMode, processed: Arc<Visualization>) {
        self.lock().entry(mode).or_default().processed = Some(processed);
    }

    pub fn invalidate(&self, mode: VisMode) {
        self.lock().remove(&mode);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn cached_modes(&self) -> Vec<VisMode> {
        let mut modes: Vec<VisMode> = self
            .lock()
            .iter()
            .filter(|(_, entry)| entry.processed.is_some())
            .map(|(mode, _)| *mode)
            .collect();
        modes.sort();
        modes
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<VisMode, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
