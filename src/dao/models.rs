use serde::{Deserialize, Serialize};

/// One persisted leaderboard line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Player name and client address, formatted as `name@ip`.
    pub player_key: String,
    /// Best score reached by that key.
    pub score: f64,
}

impl ScoreRecord {
    /// Build a record for `player_key`.
    pub fn new(player_key: impl Into<String>, score: f64) -> Self {
        Self {
            player_key: player_key.into(),
            score,
        }
    }
}
