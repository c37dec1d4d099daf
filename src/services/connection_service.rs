use std::net::SocketAddr;

use futures::StreamExt;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::{
    config::ConnectionMode, dto::response::Response, services::dispatcher, state::SharedState,
};

/// Failure while writing a response back to the peer.
#[derive(Debug, Error)]
enum WriteError {
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve newline-delimited JSON requests on one connection until it is done.
///
/// The connection ends when the peer disconnects, a transport error occurs, the
/// addressed session reaches game over, or after the first response in
/// [`ConnectionMode::PerRequest`] mode. A line longer than the configured
/// `max_request_bytes` counts as a transport error.
pub async fn handle_connection<S>(state: SharedState, stream: S, peer: SocketAddr)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!(peer = %peer, "connection opened");
    let (reader, mut writer) = tokio::io::split(stream);
    let max_line = state.config().max_request_bytes;
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(max_line));
    let mode = state.config().connection_mode;
    let mut served = 0usize;

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!(peer = %peer, limit = max_line, "request line too long");
                break;
            }
            Err(LinesCodecError::Io(err)) => {
                // Covers invalid UTF-8 as well; no partial response is sent.
                warn!(peer = %peer, error = %err, "failed to read request");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        debug!(peer = %peer, bytes = line.len(), "request received");
        let outcome = dispatcher::handle(&state, &line, peer).await;
        if let Err(err) = write_response(&mut writer, &outcome.response).await {
            warn!(peer = %peer, error = %err, "failed to send response");
            break;
        }
        served += 1;

        if outcome.session_over || mode == ConnectionMode::PerRequest {
            break;
        }
    }

    if let Err(err) = writer.shutdown().await {
        debug!(peer = %peer, error = %err, "connection shutdown failed");
    }
    info!(peer = %peer, served, "connection closed");
}

async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = response.to_json()?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
