use std::net::SocketAddr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, info};

use crate::{
    dto::{
        request::GameCommand,
        response::{Response, ResponseType},
    },
    error::ServiceError,
    state::{
        SharedState,
        game::{GameLength, GameState, epoch_millis},
        state_machine::Stage,
    },
};

/// Image shown with the handshake response.
pub const WELCOME_IMAGE: &str = "hi.png";

const NAME_PROMPT: &str = "Hello, please tell me your name.";
const TIME_IS_UP: &str = "Time is up! Game over.";

/// Open a new session and greet the player with the welcome image.
pub async fn start_session(state: &SharedState) -> Result<Response, ServiceError> {
    // Load first so a missing image does not leave an orphaned session behind.
    let image = load_image(state, WELCOME_IMAGE).await?;
    let session_id = state.sessions().create(GameState::new());
    info!(session_id = %session_id, "session created");

    Ok(Response {
        session_id: Some(session_id),
        value: Some(NAME_PROMPT.into()),
        image: Some(image),
        ..Response::new(ResponseType::Hello, true)
    })
}

/// Record the player's display name.
pub fn register_player(game: &mut GameState, name: &str) -> Result<Response, ServiceError> {
    game.register(name)?;
    Ok(Response {
        value: Some(format!(
            "Nice to meet you, {}! Type 'play' to start a game or 'quit' to leave.",
            game.player_name
        )),
        ..Response::new(ResponseType::Greeting, true)
    })
}

/// Start the clock and send the first movie image.
pub async fn begin_game(
    state: &SharedState,
    game: &mut GameState,
    length: GameLength,
) -> Result<Response, ServiceError> {
    game.begin(length, state.catalog().random(), epoch_millis())?;
    let image = load_image(state, &game.current_image()).await?;
    info!(
        player = %game.player_name,
        length = length.as_str(),
        "game started"
    );

    Ok(Response {
        message: Some(format!(
            "Game started! You have {} seconds and {} skips. Guess the movie.",
            game.duration_secs, game.skips_remaining
        )),
        image: Some(image),
        image_version: Some(game.image_version),
        skips_remaining: Some(game.skips_remaining),
        game_duration: Some(game.duration_secs),
        ..Response::new(ResponseType::Game, true)
    })
}

/// Apply one in-game command. Stage violations become a negative `game` response.
pub async fn run_command(
    state: &SharedState,
    game: &mut GameState,
    command: GameCommand,
    peer: SocketAddr,
) -> Result<Response, ServiceError> {
    let name = command.as_str().to_string();
    debug!(command = %name, stage = ?game.stage, "game command");

    let response = match apply_command(state, game, command, peer).await {
        Ok(response) => response,
        Err(ServiceError::InvalidState(invalid)) => {
            Response::failure(ResponseType::Game, invalid.player_message())
        }
        Err(err) => return Err(err),
    };

    Ok(Response {
        command: Some(name),
        ..response
    })
}

async fn apply_command(
    state: &SharedState,
    game: &mut GameState,
    command: GameCommand,
    peer: SocketAddr,
) -> Result<Response, ServiceError> {
    let now = epoch_millis();
    match command {
        GameCommand::Guess(guess) => {
            if game.stage == Stage::InPlay && game.is_expired(now) {
                return finish_game(state, game, peer, now, false).await;
            }
            if !game.guess(&guess, state.catalog().random())? {
                return Ok(Response {
                    result: Some(false),
                    message: Some("Incorrect. Try again.".into()),
                    ..Response::new(ResponseType::Game, true)
                });
            }
            let image = load_image(state, &game.current_image()).await?;
            Ok(Response {
                result: Some(true),
                message: Some("Correct! Here comes your next movie.".into()),
                image: Some(image),
                image_version: Some(game.image_version),
                ..Response::new(ResponseType::Game, true)
            })
        }
        GameCommand::Next => {
            if !game.reveal_next()? {
                return Ok(Response {
                    image_version: Some(game.image_version),
                    ..Response::failure(
                        ResponseType::Game,
                        "No more clarity available for this movie.",
                    )
                });
            }
            let image = load_image(state, &game.current_image()).await?;
            Ok(Response {
                message: Some("Here is a clearer image.".into()),
                image: Some(image),
                image_version: Some(game.image_version),
                ..Response::new(ResponseType::Game, true)
            })
        }
        GameCommand::Skip => {
            if !game.skip(state.catalog().random())? {
                return Ok(Response {
                    skips_remaining: Some(0),
                    ..Response::failure(ResponseType::Game, "No skips remaining.")
                });
            }
            let image = load_image(state, &game.current_image()).await?;
            Ok(Response {
                message: Some("Movie skipped. Here is your new movie.".into()),
                image: Some(image),
                image_version: Some(game.image_version),
                skips_remaining: Some(game.skips_remaining),
                ..Response::new(ResponseType::Game, true)
            })
        }
        GameCommand::Remaining => Ok(Response {
            message: Some(format!("You have {} skips remaining.", game.skips_remaining)),
            skips_remaining: Some(game.skips_remaining),
            ..Response::new(ResponseType::Game, true)
        }),
        GameCommand::Leaderboard => Ok(Response {
            leaderboard: Some(state.leaderboard().snapshot().await),
            ..Response::new(ResponseType::Leaderboard, true)
        }),
        GameCommand::Quit => finish_game(state, game, peer, now, true).await,
        GameCommand::Unknown(command) => Ok(Response::failure(
            ResponseType::Game,
            format!("Unknown game command: {command}"),
        )),
    }
}

/// End the game, record the score and report it with the current standings.
async fn finish_game(
    state: &SharedState,
    game: &mut GameState,
    peer: SocketAddr,
    now: i64,
    quit: bool,
) -> Result<Response, ServiceError> {
    let score = game.finish(now)?;
    let key = player_key(&game.player_name, peer);
    let improved = state.leaderboard().update(&key, score).await;
    info!(
        player = %key,
        score,
        correct = game.correct_guess_count,
        improved,
        "game finished"
    );

    let message = if quit {
        format!("Thanks for playing! Your final score is {score:.2}.")
    } else {
        TIME_IS_UP.to_string()
    };

    Ok(Response {
        message: Some(message),
        final_score: Some(score),
        leaderboard: Some(state.leaderboard().snapshot().await),
        ..Response::new(ResponseType::Game, quit)
    })
}

/// Leaderboard key of a player: `name@ip`.
pub fn player_key(name: &str, peer: SocketAddr) -> String {
    let name = name.trim();
    let name = if name.is_empty() { "anonymous" } else { name };
    format!("{name}@{}", peer.ip())
}

async fn load_image(state: &SharedState, name: &str) -> Result<String, ServiceError> {
    let bytes = state.images().load(name).await?;
    Ok(STANDARD.encode(bytes))
}
