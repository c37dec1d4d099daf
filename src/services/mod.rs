/// Per-connection read/dispatch/write loop.
pub mod connection_service;
/// Request routing and session single-writer handling.
pub mod dispatcher;
/// Quiz rules applied to a session.
pub mod game_service;
/// TCP accept loop.
pub mod listener;
/// Background expiry of idle sessions.
pub mod session_sweeper;
