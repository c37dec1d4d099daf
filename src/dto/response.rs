use serde::{Deserialize, Serialize};

/// Category of a response, used by clients to pick a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Answer to the `start` handshake.
    Hello,
    /// Answer to `name`.
    Greeting,
    /// Outcome of a game command or of `gameStart`.
    Game,
    /// Request could not be processed.
    Error,
    /// Answer to the `leaderboard` command.
    Leaderboard,
}

/// One response line. Absent fields are omitted from the JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Response category, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// Whether the request had its intended effect.
    pub ok: bool,
    /// Only set on the handshake response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Prompt text for the handshake and greeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Human readable outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Base64-encoded image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Obscuration level of the embedded image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_version: Option<u8>,
    /// Skips left in the current game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skips_remaining: Option<u32>,
    /// Allowed play time in seconds, sent when the game starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_duration: Option<u64>,
    /// Whether a guess was correct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    /// Score recorded when the game ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    /// Formatted leaderboard snapshot, one `key: score` per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<String>,
    /// Echo of the game command that produced this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Response {
    /// Empty response of the given kind.
    pub fn new(kind: ResponseType, ok: bool) -> Self {
        Self {
            kind,
            ok,
            session_id: None,
            value: None,
            message: None,
            image: None,
            image_version: None,
            skips_remaining: None,
            game_duration: None,
            result: None,
            final_score: None,
            leaderboard: None,
            command: None,
        }
    }

    /// Negative outcome carrying an explanation.
    pub fn failure(kind: ResponseType, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(kind, false)
        }
    }

    /// Encode as a single JSON line without the trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted() {
        let json = Response::failure(ResponseType::Error, "nope").to_json().unwrap();
        assert_eq!(json, r#"{"type":"error","ok":false,"message":"nope"}"#);
    }

    #[test]
    fn fields_use_camel_case() {
        let response = Response {
            session_id: Some("abc".into()),
            skips_remaining: Some(2),
            image_version: Some(1),
            final_score: Some(12.5),
            ..Response::new(ResponseType::Game, true)
        };
        let json = response.to_json().unwrap();
        assert!(json.contains(r#""sessionId":"abc""#));
        assert!(json.contains(r#""skipsRemaining":2"#));
        assert!(json.contains(r#""imageVersion":1"#));
        assert!(json.contains(r#""finalScore":12.5"#));
    }
}
