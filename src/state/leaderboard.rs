use std::{cmp::Ordering, sync::Arc};

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::dao::{models::ScoreRecord, score_store::ScoreStore, storage::StorageResult};

/// Best score per player key, persisted through a [`ScoreStore`].
///
/// Every operation runs under a single lock, held across the rewrite of the backing
/// store so concurrent updates never interleave their writes.
pub struct Leaderboard {
    scores: Mutex<IndexMap<String, f64>>,
    store: Arc<dyn ScoreStore>,
}

impl Leaderboard {
    /// Start with an empty leaderboard without reading the store.
    pub fn empty(store: Arc<dyn ScoreStore>) -> Self {
        Self {
            scores: Mutex::new(IndexMap::new()),
            store,
        }
    }

    /// Read the whole leaderboard from the store once.
    pub async fn load(store: Arc<dyn ScoreStore>) -> StorageResult<Self> {
        let records = store.load().await?;
        let mut scores = IndexMap::with_capacity(records.len());
        for record in records {
            merge_best(&mut scores, record.player_key, record.score);
        }
        info!(entries = scores.len(), "leaderboard ready");
        Ok(Self {
            scores: Mutex::new(scores),
            store,
        })
    }

    /// Record `score` for `player_key` if it beats the stored one.
    ///
    /// Returns whether the entry changed. Accepted scores are kept in memory even if the
    /// rewrite of the backing store fails.
    pub async fn update(&self, player_key: &str, score: f64) -> bool {
        if !score.is_finite() || score < 0.0 {
            warn!(player_key, score, "ignoring invalid score");
            return false;
        }

        let mut scores = self.scores.lock().await;
        if !merge_best(&mut scores, player_key.to_string(), score) {
            return false;
        }

        let records = scores
            .iter()
            .map(|(key, score)| ScoreRecord::new(key.clone(), *score))
            .collect();
        if let Err(err) = self.store.save(records).await {
            warn!(player_key, error = %err, "failed to persist leaderboard");
        }
        true
    }

    /// Best score stored for `player_key`.
    pub async fn best(&self, player_key: &str) -> Option<f64> {
        self.scores.lock().await.get(player_key).copied()
    }

    /// Entries sorted by score, best first; ties are ordered by key.
    pub async fn entries(&self) -> Vec<ScoreRecord> {
        let scores = self.scores.lock().await;
        let mut entries: Vec<ScoreRecord> = scores
            .iter()
            .map(|(key, score)| ScoreRecord::new(key.clone(), *score))
            .collect();
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.player_key.cmp(&b.player_key))
        });
        entries
    }

    /// Leaderboard rendered as `key: score` lines with two decimals.
    pub async fn snapshot(&self) -> String {
        self.entries()
            .await
            .iter()
            .map(|entry| format!("{}: {:.2}", entry.player_key, entry.score))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn merge_best(scores: &mut IndexMap<String, f64>, key: String, score: f64) -> bool {
    match scores.get_mut(&key) {
        Some(existing) if score > *existing => {
            *existing = score;
            true
        }
        Some(_) => false,
        None => {
            scores.insert(key, score);
            true
        }
    }
}
