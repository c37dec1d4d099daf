use std::net::SocketAddr;

use tracing::{debug, warn};

use crate::{
    dto::{
        request::{Request, SessionAction},
        response::Response,
    },
    error::ServiceError,
    services::game_service,
    state::SharedState,
};

/// Response to one request line, plus whether its session has ended.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Line to send back to the peer.
    pub response: Response,
    /// The addressed session reached the game-over stage.
    pub session_over: bool,
}

impl Outcome {
    fn open(response: Response) -> Self {
        Self {
            response,
            session_over: false,
        }
    }
}

/// Parse, route and answer one request line.
///
/// Never fails: every error is turned into a response. Session state is only written back
/// when the request succeeded.
pub async fn handle(state: &SharedState, raw: &str, peer: SocketAddr) -> Outcome {
    let request = match Request::from_json_str(raw) {
        Ok(request) => request,
        Err(err) => {
            warn!(peer = %peer, error = %err, "rejected request");
            return Outcome::open(err.into());
        }
    };

    match dispatch(state, request, peer).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(peer = %peer, error = %err, "request failed");
            Outcome::open(err.into())
        }
    }
}

async fn dispatch(
    state: &SharedState,
    request: Request,
    peer: SocketAddr,
) -> Result<Outcome, ServiceError> {
    let (session_id, action) = match request {
        Request::Start => return game_service::start_session(state).await.map(Outcome::open),
        Request::Session { session_id, action } => (session_id, action),
    };

    let mut guard = state
        .sessions()
        .lock(&session_id)
        .await
        .ok_or(ServiceError::InvalidSession)?;
    let mut game = guard.snapshot();
    debug!(session_id = %guard.id(), action = ?action, "dispatching request");

    let response = match action {
        SessionAction::Name(name) => game_service::register_player(&mut game, &name)?,
        SessionAction::GameStart(length) => {
            game_service::begin_game(state, &mut game, length).await?
        }
        SessionAction::Game(command) => {
            game_service::run_command(state, &mut game, command, peer).await?
        }
    };

    let session_over = game.stage.is_over();
    guard.commit(game);
    Ok(Outcome {
        response,
        session_over,
    })
}
