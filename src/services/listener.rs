use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{services::connection_service::handle_connection, state::SharedState};

/// Accept connections until `shutdown` resolves, spawning one handler task per peer.
///
/// In-flight connections are left to finish on their own once the loop exits.
pub async fn serve<F>(listener: TcpListener, state: SharedState, shutdown: F)
where
    F: Future<Output = ()> + Send,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested; no longer accepting connections");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(peer = %peer, error = %err, "failed to disable Nagle");
                    }
                    tokio::spawn(handle_connection(state.clone(), stream, peer));
                }
                Err(err) => warn!(error = %err, "failed to accept connection"),
            },
        }
    }
}
