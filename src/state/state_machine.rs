use thiserror::Error;

/// High-level stages a quiz session goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Session created; the player may register a name and pick a game length.
    #[default]
    NotStarted,
    /// A movie is on screen and the clock is running.
    InPlay,
    /// Final score computed; no further gameplay is accepted.
    GameOver,
}

/// Events that can be applied to a session's stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Player provides a display name.
    Register,
    /// Player selects a game length and play begins.
    Begin,
    /// A guess is checked against the current answer.
    Guess,
    /// A clearer image of the current movie is requested.
    Next,
    /// The current movie is skipped.
    Skip,
    /// The game ends, either by quitting or because the time ran out.
    Finish,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The stage the session was in when the invalid event was received.
    pub from: Stage,
    /// The event that cannot be applied from this stage.
    pub event: GameEvent,
}

impl InvalidTransition {
    /// Human readable explanation sent back to the player.
    pub fn player_message(&self) -> &'static str {
        match self.from {
            Stage::NotStarted => "Game not started. Please type 'play' to start the game.",
            Stage::InPlay => "A game is already in progress.",
            Stage::GameOver => "The game is over. Start a new session to play again.",
        }
    }
}

impl Stage {
    /// Compute the stage reached by applying `event`, if the transition is valid.
    pub fn transition(self, event: GameEvent) -> Result<Stage, InvalidTransition> {
        let next = match (self, event) {
            (Stage::NotStarted, GameEvent::Register) => Stage::NotStarted,
            (Stage::NotStarted, GameEvent::Begin) => Stage::InPlay,
            (Stage::InPlay, GameEvent::Guess | GameEvent::Next | GameEvent::Skip) => Stage::InPlay,
            (Stage::NotStarted | Stage::InPlay, GameEvent::Finish) => Stage::GameOver,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }

    /// Whether no further gameplay is accepted.
    pub fn is_over(self) -> bool {
        self == Stage::GameOver
    }
}
