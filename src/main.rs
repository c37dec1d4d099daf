//! Movie Quiz Back binary entrypoint wiring the TCP listener, leaderboard and image storage.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_quiz_back::{
    config::AppConfig,
    dao::{images::DirectoryImageProvider, score_store::JsonFileScoreStore},
    services::{listener, session_sweeper},
    state::{AppState, leaderboard::Leaderboard},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let store = Arc::new(JsonFileScoreStore::new(config.leaderboard_path.clone()));
    let leaderboard = match Leaderboard::load(store).await {
        Ok(leaderboard) => leaderboard,
        Err(err) => {
            error!(
                path = %config.leaderboard_path.display(),
                error = %err,
                "failed to load leaderboard"
            );
            return Err(err).context("loading leaderboard");
        }
    };
    let images = Arc::new(DirectoryImageProvider::new(config.image_dir.clone()));

    let addr = config
        .bind_address()
        .with_context(|| format!("invalid listen host `{}`", config.host))?;
    let app_state = AppState::new(config, leaderboard, images);

    tokio::spawn(session_sweeper::run(app_state.clone()));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "movie quiz server listening");

    listener::serve(listener, app_state, shutdown_signal()).await;
    info!("server stopped");

    Ok(())
}

/// Configure tracing subscribers; `RUST_LOG` overrides the default `info` filter.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
