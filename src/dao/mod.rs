/// Image providers used to embed pictures in responses.
pub mod images;
/// Persisted record definitions.
pub mod models;
/// Leaderboard persistence backends.
pub mod score_store;
/// Storage error types shared by the backends.
pub mod storage;
