use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use tracing::{debug, info};

use super::ScoreStore;
use crate::dao::{
    models::ScoreRecord,
    storage::{StorageError, StorageResult},
};

/// Leaderboard persisted as a JSON array of `{playerKey, score}` records.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: Arc<PathBuf>,
}

impl JsonFileScoreStore {
    /// Store backed by the file at `path`; it is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreRecord>>> {
        let path = self.path.clone();
        async move {
            let contents = match tokio::fs::read(path.as_ref()).await {
                Ok(contents) => contents,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    info!(path = %path.display(), "leaderboard file not found; starting empty");
                    return Ok(Vec::new());
                }
                Err(err) => {
                    return Err(StorageError::unavailable(
                        format!("failed to read `{}`", path.display()),
                        err,
                    ));
                }
            };

            let records: Vec<ScoreRecord> = serde_json::from_slice(&contents).map_err(|err| {
                StorageError::corrupt(format!("failed to parse `{}`", path.display()), err)
            })?;
            info!(path = %path.display(), count = records.len(), "loaded leaderboard");
            Ok(records)
        }
        .boxed()
    }

    fn save(&self, records: Vec<ScoreRecord>) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        async move {
            let payload = serde_json::to_vec_pretty(&records).map_err(|err| {
                StorageError::unavailable("failed to serialize leaderboard".into(), err)
            })?;
            tokio::fs::write(path.as_ref(), payload)
                .await
                .map_err(|err| {
                    StorageError::unavailable(
                        format!("failed to write `{}`", path.display()),
                        err,
                    )
                })?;
            debug!(path = %path.display(), count = records.len(), "leaderboard rewritten");
            Ok(())
        }
        .boxed()
    }
}
