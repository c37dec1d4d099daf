/// Movies the quiz draws from.
pub mod catalog;
/// Per-session game state and scoring.
pub mod game;
/// Best score per player.
pub mod leaderboard;
/// Live session registry.
pub mod sessions;
/// Session stages and allowed transitions.
pub mod state_machine;

use std::sync::Arc;

use crate::{config::AppConfig, dao::images::ImageProvider};

use self::{catalog::MovieCatalog, leaderboard::Leaderboard, sessions::SessionStore};

/// Handle to [`AppState`] shared across tasks.
pub type SharedState = Arc<AppState>;

/// Central application state shared by every connection handler.
pub struct AppState {
    config: AppConfig,
    sessions: SessionStore,
    leaderboard: Leaderboard,
    catalog: MovieCatalog,
    images: Arc<dyn ImageProvider>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        leaderboard: Leaderboard,
        images: Arc<dyn ImageProvider>,
    ) -> SharedState {
        let catalog = MovieCatalog::new(config.movies.clone());
        Arc::new(Self {
            config,
            sessions: SessionStore::new(),
            leaderboard,
            catalog,
            images,
        })
    }

    /// Configuration the server was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of live sessions keyed by their token.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Best scores shared by every session.
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Movies the quiz draws from.
    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }

    /// Collaborator serving image bytes.
    pub fn images(&self) -> &dyn ImageProvider {
        self.images.as_ref()
    }
}
