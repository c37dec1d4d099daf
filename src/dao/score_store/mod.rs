/// Leaderboard kept in a JSON file on disk.
pub mod json_file;
/// Leaderboard kept in memory.
pub mod memory;

use crate::dao::models::ScoreRecord;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

pub use json_file::JsonFileScoreStore;
pub use memory::MemoryScoreStore;

/// Abstraction over the medium backing the leaderboard.
///
/// Implementations always work on the whole collection: the leaderboard is loaded
/// once at startup and rewritten in full after every accepted update.
pub trait ScoreStore: Send + Sync {
    /// Read every stored record.
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreRecord>>>;
    /// Replace the stored records with `records`.
    fn save(&self, records: Vec<ScoreRecord>) -> BoxFuture<'static, StorageResult<()>>;
}
