use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::state::SharedState;

/// Periodically drop sessions that have been idle longer than the configured timeout.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing can be idle yet.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        sweep_once(&state);
    }
}

fn sweep_once(state: &SharedState) -> usize {
    let ttl = state.config().session_idle_timeout;
    let removed = state.sessions().sweep_idle(ttl);
    if removed > 0 {
        info!(removed, remaining = state.sessions().len(), "expired idle sessions");
    } else {
        debug!(remaining = state.sessions().len(), "no idle sessions to expire");
    }
    removed
}
