use std::sync::{Arc, Mutex};

use futures::{FutureExt, future::BoxFuture};

use super::ScoreStore;
use crate::dao::{models::ScoreRecord, storage::StorageResult};

/// Volatile score store for tests; records live only as long as the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryScoreStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with records returned by the next [`ScoreStore::load`].
    pub fn with_records(records: Vec<ScoreRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut guard) = store.records.lock() {
            *guard = records;
        }
        store
    }

    /// Records written by the last save.
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of full rewrites performed so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|guard| *guard).unwrap_or_default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreRecord>>> {
        let records = self.records();
        async move { Ok(records) }.boxed()
    }

    fn save(&self, records: Vec<ScoreRecord>) -> BoxFuture<'static, StorageResult<()>> {
        if let Ok(mut guard) = self.records.lock() {
            *guard = records;
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        async move { Ok(()) }.boxed()
    }
}
