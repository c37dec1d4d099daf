use thiserror::Error;

use crate::{
    dao::images::ImageError,
    dto::response::{Response, ResponseType},
    state::state_machine::InvalidTransition,
};

/// Errors that abort the processing of a single request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request text is not a usable request.
    #[error("malformed request: {0}")]
    Protocol(String),
    /// The request carried no session id.
    #[error("missing session")]
    MissingSession,
    /// The session id is not (or no longer) known.
    #[error("invalid session")]
    InvalidSession,
    /// The request type is not part of the protocol.
    #[error("unknown request type: {0}")]
    UnknownType(String),
    /// Operation cannot be performed in the current stage.
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidTransition),
    /// A resource needed to build the response is unavailable.
    #[error("resource unavailable")]
    Resource(#[from] ImageError),
}

impl ServiceError {
    /// Message sent back to the client.
    fn client_message(&self) -> String {
        match self {
            ServiceError::Protocol(reason) => format!("Malformed request: {reason}"),
            ServiceError::MissingSession => "Missing sessionId. Please log in again.".into(),
            ServiceError::InvalidSession => "Invalid session. Please log in again.".into(),
            ServiceError::UnknownType(kind) => format!("Unknown request type: {kind}"),
            ServiceError::InvalidState(invalid) => invalid.player_message().into(),
            ServiceError::Resource(_) => {
                "Processing error: the request could not be completed.".into()
            }
        }
    }
}

impl From<ServiceError> for Response {
    fn from(err: ServiceError) -> Self {
        Response::failure(ResponseType::Error, err.client_message())
    }
}
