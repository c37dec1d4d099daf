//! Library crate for movie-quiz-back, exposing modules for the binary and integration tests.

/// Runtime configuration.
pub mod config;
/// Persistence and resource collaborators.
pub mod dao;
/// Wire protocol types.
pub mod dto;
/// Request-level error type.
pub mod error;
/// Connection handling and quiz rules.
pub mod services;
/// Shared application state.
pub mod state;
