//! Application-level configuration loading, including the runtime movie catalog.

use std::{
    env, fs,
    io::ErrorKind,
    net::{AddrParseError, IpAddr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use tracing::{info, warn};

use crate::state::catalog::{Movie, default_movies};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIE_QUIZ_CONFIG_PATH";
/// Environment variable that overrides the listening port.
const PORT_ENV: &str = "PORT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 9000;
const DEFAULT_IMAGE_DIR: &str = "img";
const DEFAULT_LEADERBOARD_PATH: &str = "leaderboard.json";
const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024;

/// How long a client connection stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// Keep serving requests until the session is over or the peer disconnects.
    #[default]
    Persistent,
    /// Close the connection after the first response.
    PerRequest,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Interface the listener binds to.
    pub host: String,
    /// TCP port the listener binds to.
    pub port: u16,
    /// Directory holding the quiz images.
    pub image_dir: PathBuf,
    /// JSON file backing the leaderboard.
    pub leaderboard_path: PathBuf,
    /// Idle time after which a session is expired.
    pub session_idle_timeout: Duration,
    /// Period of the idle session sweep.
    pub sweep_interval: Duration,
    /// How long client connections stay open.
    pub connection_mode: ConnectionMode,
    /// Longest request line accepted; a longer one closes the connection.
    pub max_request_bytes: usize,
    /// Catalog the quiz draws from.
    pub movies: Vec<Movie>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        movies = config.movies.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    /// Parse a configuration document; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env::var(PORT_ENV)
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }
        self
    }

    /// Address the listener binds to. `host` must be an IPv4 or IPv6 literal.
    pub fn bind_address(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.trim().parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    host: Option<String>,
    port: Option<u16>,
    image_dir: Option<PathBuf>,
    leaderboard_path: Option<PathBuf>,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    session_idle_timeout_secs: Option<Duration>,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    sweep_interval_secs: Option<Duration>,
    connection_mode: Option<ConnectionMode>,
    max_request_bytes: Option<usize>,
    movies: Vec<RawMovie>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let movies = if value.movies.is_empty() {
            default_movies()
        } else {
            value.movies.into_iter().map(Into::into).collect()
        };

        Self {
            host: value.host.unwrap_or_else(|| DEFAULT_HOST.into()),
            port: value.port.unwrap_or(DEFAULT_PORT),
            image_dir: value
                .image_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR)),
            leaderboard_path: value
                .leaderboard_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD_PATH)),
            session_idle_timeout: value
                .session_idle_timeout_secs
                .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT),
            sweep_interval: value
                .sweep_interval_secs
                .filter(|interval| !interval.is_zero())
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
            connection_mode: value.connection_mode.unwrap_or_default(),
            max_request_bytes: value
                .max_request_bytes
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_MAX_REQUEST_BYTES),
            movies,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of a single catalog entry inside the configuration file.
struct RawMovie {
    subject_id: String,
    answer: String,
}

impl From<RawMovie> for Movie {
    fn from(value: RawMovie) -> Self {
        Movie::new(value.subject_id, value.answer)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
