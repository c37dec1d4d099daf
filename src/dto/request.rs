use serde::Deserialize;

use crate::{error::ServiceError, state::game::GameLength};

/// Wire shape of a request line; every field is optional until validated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(alias = "sessionID")]
    session_id: Option<String>,
    value: Option<String>,
    game_length: Option<String>,
    command: Option<String>,
    guess: Option<String>,
}

/// Validated request accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Handshake opening a new session.
    Start,
    /// Any other request, addressed to an existing session.
    Session {
        /// Token returned by the `start` handshake.
        session_id: String,
        /// What to do with the session.
        action: SessionAction,
    },
}

/// Operation applied to an existing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Player registers a display name.
    Name(String),
    /// Player starts playing with the chosen length.
    GameStart(GameLength),
    /// In-game command.
    Game(GameCommand),
}

/// Commands accepted by a `game` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Check a title against the movie on screen.
    Guess(String),
    /// Ask for a clearer image.
    Next,
    /// Spend a skip on a new movie.
    Skip,
    /// Report the skips left.
    Remaining,
    /// Show the leaderboard.
    Leaderboard,
    /// End the game and record the score.
    Quit,
    /// Anything else; answered with a negative response.
    Unknown(String),
}

impl GameCommand {
    fn parse(command: &str, guess: Option<String>) -> Result<Self, ServiceError> {
        let command = match command {
            "guess" => {
                let guess = guess.ok_or_else(|| ServiceError::Protocol("missing `guess`".into()))?;
                GameCommand::Guess(guess)
            }
            "next" => GameCommand::Next,
            "skip" => GameCommand::Skip,
            "remaining" => GameCommand::Remaining,
            "leaderboard" => GameCommand::Leaderboard,
            "quit" => GameCommand::Quit,
            other => GameCommand::Unknown(other.to_string()),
        };
        Ok(command)
    }

    /// Command name as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            GameCommand::Guess(_) => "guess",
            GameCommand::Next => "next",
            GameCommand::Skip => "skip",
            GameCommand::Remaining => "remaining",
            GameCommand::Leaderboard => "leaderboard",
            GameCommand::Quit => "quit",
            GameCommand::Unknown(command) => command,
        }
    }
}

impl Request {
    /// Parse and validate one request line.
    pub fn from_json_str(text: &str) -> Result<Self, ServiceError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|err| ServiceError::Protocol(format!("invalid JSON: {err}")))?;
        if !value.is_object() {
            return Err(ServiceError::Protocol("expected a JSON object".into()));
        }
        let raw: RawRequest = serde_json::from_value(value)
            .map_err(|err| ServiceError::Protocol(err.to_string()))?;

        let kind = raw
            .kind
            .ok_or_else(|| ServiceError::Protocol("missing `type`".into()))?;

        if kind == "start" {
            return Ok(Request::Start);
        }
        if !matches!(kind.as_str(), "name" | "gameStart" | "game") {
            return Err(ServiceError::UnknownType(kind));
        }

        let session_id = raw
            .session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ServiceError::MissingSession)?;

        let action = match kind.as_str() {
            "name" => {
                let name = raw
                    .value
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| ServiceError::Protocol("missing player name".into()))?;
                SessionAction::Name(name)
            }
            "gameStart" => {
                SessionAction::GameStart(GameLength::parse_lenient(raw.game_length.as_deref()))
            }
            _ => {
                let command = raw
                    .command
                    .ok_or_else(|| ServiceError::Protocol("missing `command`".into()))?;
                SessionAction::Game(GameCommand::parse(command.trim(), raw.guess)?)
            }
        };

        Ok(Request::Session { session_id, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Request, ServiceError> {
        Request::from_json_str(text)
    }

    #[test]
    fn start_needs_no_session() {
        assert_eq!(parse(r#"{"type":"start"}"#).unwrap(), Request::Start);
    }

    #[test]
    fn invalid_json_is_a_protocol_error() {
        assert!(matches!(parse("{nope"), Err(ServiceError::Protocol(_))));
        assert!(matches!(parse("[1,2]"), Err(ServiceError::Protocol(_))));
    }

    #[test]
    fn missing_type_is_a_protocol_error() {
        assert!(matches!(
            parse(r#"{"sessionId":"abc"}"#),
            Err(ServiceError::Protocol(_))
        ));
    }

    #[test]
    fn unknown_type_is_reported() {
        assert!(matches!(
            parse(r#"{"type":"dance","sessionId":"abc"}"#),
            Err(ServiceError::UnknownType(kind)) if kind == "dance"
        ));
    }

    #[test]
    fn session_is_required_after_start() {
        for text in [
            r#"{"type":"name","value":"Ann"}"#,
            r#"{"type":"gameStart"}"#,
            r#"{"type":"game","command":"skip","sessionId":"  "}"#,
        ] {
            assert!(matches!(parse(text), Err(ServiceError::MissingSession)));
        }
    }

    fn session(session_id: &str, action: SessionAction) -> Request {
        Request::Session {
            session_id: session_id.into(),
            action,
        }
    }

    #[test]
    fn legacy_session_field_is_accepted() {
        assert_eq!(
            parse(r#"{"type":"name","sessionID":"abc","value":" Ann "}"#).unwrap(),
            session("abc", SessionAction::Name("Ann".into()))
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(
            parse(r#"{"type":"name","sessionId":"abc","value":"   "}"#),
            Err(ServiceError::Protocol(_))
        ));
    }

    #[test]
    fn game_length_is_lenient() {
        assert_eq!(
            parse(r#"{"type":"gameStart","sessionId":"abc","gameLength":"Medium"}"#).unwrap(),
            session("abc", SessionAction::GameStart(GameLength::Medium))
        );
        assert_eq!(
            parse(r#"{"type":"gameStart","sessionId":"abc"}"#).unwrap(),
            session("abc", SessionAction::GameStart(GameLength::Short))
        );
    }

    #[test]
    fn game_commands_are_parsed() {
        let command = |text: &str| match parse(text).unwrap() {
            Request::Session {
                action: SessionAction::Game(command),
                ..
            } => command,
            other => panic!("expected game request, got {other:?}"),
        };

        assert_eq!(
            command(r#"{"type":"game","sessionId":"s","command":"guess","guess":"Jaws"}"#),
            GameCommand::Guess("Jaws".into())
        );
        assert_eq!(
            command(r#"{"type":"game","sessionId":"s","command":"leaderboard"}"#),
            GameCommand::Leaderboard
        );
        assert_eq!(
            command(r#"{"type":"game","sessionId":"s","command":"fly"}"#),
            GameCommand::Unknown("fly".into())
        );
    }

    #[test]
    fn guess_without_text_is_malformed() {
        assert!(matches!(
            parse(r#"{"type":"game","sessionId":"s","command":"guess"}"#),
            Err(ServiceError::Protocol(_))
        ));
    }
}
