use std::str::FromStr;

use time::OffsetDateTime;

use crate::state::{
    catalog::Movie,
    state_machine::{GameEvent, InvalidTransition, Stage},
};

/// Clearest obscuration level available for a movie.
pub const MAX_IMAGE_VERSION: u8 = 4;

/// Game length chosen when play begins; couples the time limit with the skip allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameLength {
    /// 30 seconds, 2 skips.
    #[default]
    Short,
    /// 60 seconds, 4 skips.
    Medium,
    /// 90 seconds, 6 skips.
    Long,
}

impl GameLength {
    /// Allowed play time in seconds.
    pub fn duration_secs(self) -> u64 {
        match self {
            GameLength::Short => 30,
            GameLength::Medium => 60,
            GameLength::Long => 90,
        }
    }

    /// Number of skips granted for the whole game.
    pub fn skips(self) -> u32 {
        match self {
            GameLength::Short => 2,
            GameLength::Medium => 4,
            GameLength::Long => 6,
        }
    }

    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            GameLength::Short => "short",
            GameLength::Medium => "medium",
            GameLength::Long => "long",
        }
    }

    /// Parse a client-supplied length, treating absent or unknown values as short.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for GameLength {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(GameLength::Short),
            "medium" => Ok(GameLength::Medium),
            "long" => Ok(GameLength::Long),
            _ => Err(()),
        }
    }
}

/// Per-session quiz state.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Where the session is in its lifecycle.
    pub stage: Stage,
    /// Trimmed display name; empty until registered.
    pub player_name: String,
    /// Image stem of the movie on screen.
    pub current_subject: String,
    /// Title that counts as a correct guess.
    pub current_answer: String,
    /// Obscuration level in `1..=MAX_IMAGE_VERSION`; higher is clearer.
    pub image_version: u8,
    /// Skips left for this game.
    pub skips_remaining: u32,
    /// Movies guessed so far.
    pub correct_guess_count: u32,
    /// Epoch milliseconds at which play began.
    pub started_at_ms: i64,
    /// Allowed play time.
    pub duration_secs: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            stage: Stage::NotStarted,
            player_name: String::new(),
            current_subject: String::new(),
            current_answer: String::new(),
            image_version: 1,
            skips_remaining: 0,
            correct_guess_count: 0,
            started_at_ms: 0,
            duration_secs: 0,
        }
    }
}

impl GameState {
    /// Fresh session waiting for a name.
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&mut self, event: GameEvent) -> Result<(), InvalidTransition> {
        self.stage = self.stage.transition(event)?;
        Ok(())
    }

    /// Record the player's display name.
    pub fn register(&mut self, name: &str) -> Result<(), InvalidTransition> {
        self.advance(GameEvent::Register)?;
        self.player_name = name.trim().to_string();
        Ok(())
    }

    /// Start the clock and put the first movie on screen.
    pub fn begin(
        &mut self,
        length: GameLength,
        movie: Movie,
        now_ms: i64,
    ) -> Result<(), InvalidTransition> {
        self.advance(GameEvent::Begin)?;
        self.duration_secs = length.duration_secs();
        self.skips_remaining = length.skips();
        self.started_at_ms = now_ms;
        self.start_round(movie);
        Ok(())
    }

    fn start_round(&mut self, movie: Movie) {
        self.current_subject = movie.subject_id;
        self.current_answer = movie.answer;
        self.image_version = 1;
    }

    /// Whether the allowed play time has elapsed at `now_ms`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.started_at_ms > self.duration_millis()
    }

    fn duration_millis(&self) -> i64 {
        i64::try_from(self.duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    /// Check a guess; on a match the next movie is put on screen.
    pub fn guess(&mut self, guess: &str, next: Movie) -> Result<bool, InvalidTransition> {
        self.stage.transition(GameEvent::Guess)?;
        if !guess.trim().eq_ignore_ascii_case(self.current_answer.trim()) {
            return Ok(false);
        }
        self.correct_guess_count += 1;
        self.start_round(next);
        Ok(true)
    }

    /// Reveal a clearer image. Returns `false` when the clearest one is already shown.
    pub fn reveal_next(&mut self) -> Result<bool, InvalidTransition> {
        self.stage.transition(GameEvent::Next)?;
        if self.image_version >= MAX_IMAGE_VERSION {
            return Ok(false);
        }
        self.image_version += 1;
        Ok(true)
    }

    /// Spend a skip on a new movie. Returns `false` when no skips are left.
    pub fn skip(&mut self, next: Movie) -> Result<bool, InvalidTransition> {
        self.stage.transition(GameEvent::Skip)?;
        if self.skips_remaining == 0 {
            return Ok(false);
        }
        self.skips_remaining -= 1;
        self.start_round(next);
        Ok(true)
    }

    /// End the game and return the final score.
    pub fn finish(&mut self, now_ms: i64) -> Result<f64, InvalidTransition> {
        let score = self.score(now_ms);
        self.advance(GameEvent::Finish)?;
        Ok(score)
    }

    /// Score reached so far.
    pub fn score(&self, now_ms: i64) -> f64 {
        if self.stage == Stage::NotStarted {
            return 0.0;
        }
        compute_score(self.correct_guess_count, self.started_at_ms, now_ms)
    }

    /// File name of the image currently on screen.
    pub fn current_image(&self) -> String {
        super::catalog::image_name(&self.current_subject, self.image_version)
    }
}

/// `correct / elapsed_secs * 100`, with elapsed time counted in whole seconds.
/// Zero elapsed seconds yields a score of zero.
pub fn compute_score(correct_guess_count: u32, started_at_ms: i64, now_ms: i64) -> f64 {
    let elapsed_secs = (now_ms - started_at_ms).max(0) / 1000;
    if elapsed_secs == 0 {
        return 0.0;
    }
    f64::from(correct_guess_count) / elapsed_secs as f64 * 100.0
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_millis() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}
