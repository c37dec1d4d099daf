use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use movie_quiz_back::{
    config::{AppConfig, ConnectionMode},
    dao::{
        images::MemoryImageProvider,
        models::ScoreRecord,
        score_store::{JsonFileScoreStore, MemoryScoreStore, ScoreStore},
    },
    dto::response::{Response, ResponseType},
    services::listener,
    state::{AppState, SharedState, catalog::Movie, leaderboard::Leaderboard},
};
use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::oneshot,
};
use uuid::Uuid;

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, request: serde_json::Value) -> Response {
        let mut line = request.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
        let reply = self.lines.next_line().await.unwrap().expect("response line");
        serde_json::from_str(&reply).unwrap()
    }

    async fn is_closed(&mut self) -> bool {
        matches!(self.lines.next_line().await, Ok(None) | Err(_))
    }
}

fn images() -> HashMap<String, Vec<u8>> {
    let mut images = HashMap::from([("hi.png".to_string(), b"hello".to_vec())]);
    for version in 1..=4u8 {
        images.insert(format!("Jaws{version}.png"), vec![version; 8]);
    }
    images
}

async fn spawn_server(
    mode: ConnectionMode,
    store: Arc<dyn ScoreStore>,
) -> (SocketAddr, SharedState, oneshot::Sender<()>) {
    let config = AppConfig {
        connection_mode: mode,
        movies: vec![Movie::new("Jaws", "Jaws")],
        ..AppConfig::default()
    };
    let leaderboard = Leaderboard::load(store).await.unwrap();
    let state = AppState::new(
        config,
        leaderboard,
        Arc::new(MemoryImageProvider::new(images())),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(listener::serve(listener, state.clone(), async move {
        let _ = stop_rx.await;
    }));
    (addr, state, stop_tx)
}

#[tokio::test]
async fn plays_a_full_game_over_one_connection() {
    let store = Arc::new(MemoryScoreStore::new());
    let (addr, state, _stop) = spawn_server(ConnectionMode::Persistent, store.clone()).await;
    let mut client = Client::connect(addr).await;

    let hello = client.send(json!({"type": "start"})).await;
    assert_eq!(hello.kind, ResponseType::Hello);
    assert!(hello.ok);
    assert_eq!(hello.image.as_deref(), Some("aGVsbG8="));
    let id = hello.session_id.expect("session id");

    let greeting = client
        .send(json!({"type": "name", "sessionId": id, "value": "Ann"}))
        .await;
    assert_eq!(greeting.kind, ResponseType::Greeting);
    assert!(greeting.value.unwrap().contains("Ann"));

    let started = client
        .send(json!({"type": "gameStart", "sessionId": id, "gameLength": "short"}))
        .await;
    assert!(started.ok);
    assert_eq!(started.skips_remaining, Some(2));
    assert_eq!(started.image_version, Some(1));

    let skipped = client
        .send(json!({"type": "game", "sessionId": id, "command": "skip"}))
        .await;
    assert_eq!(skipped.skips_remaining, Some(1));
    assert_eq!(skipped.command.as_deref(), Some("skip"));

    let clearer = client
        .send(json!({"type": "game", "sessionId": id, "command": "next"}))
        .await;
    assert_eq!(clearer.image_version, Some(2));

    let wrong = client
        .send(json!({"type": "game", "sessionId": id, "command": "guess", "guess": "wrong answer"}))
        .await;
    assert_eq!(wrong.result, Some(false));

    let right = client
        .send(json!({"type": "game", "sessionId": id, "command": "guess", "guess": "  JAWS "}))
        .await;
    assert_eq!(right.result, Some(true));
    assert_eq!(right.image_version, Some(1));

    let remaining = client
        .send(json!({"type": "game", "sessionId": id, "command": "remaining"}))
        .await;
    assert_eq!(remaining.skips_remaining, Some(1));

    let quit = client
        .send(json!({"type": "game", "sessionId": id, "command": "quit"}))
        .await;
    assert!(quit.ok);
    assert_eq!(quit.command.as_deref(), Some("quit"));
    assert!(quit.final_score.unwrap() >= 0.0);
    assert!(quit.leaderboard.unwrap().contains("Ann@127.0.0.1"));

    assert!(client.is_closed().await);
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].player_key, "Ann@127.0.0.1");
    assert!(state.leaderboard().best("Ann@127.0.0.1").await.is_some());
}

#[tokio::test]
async fn sessions_span_connections_in_per_request_mode() {
    let (addr, _state, _stop) =
        spawn_server(ConnectionMode::PerRequest, Arc::new(MemoryScoreStore::new())).await;

    let mut first = Client::connect(addr).await;
    let id = first
        .send(json!({"type": "start"}))
        .await
        .session_id
        .unwrap();
    assert!(first.is_closed().await);

    let mut second = Client::connect(addr).await;
    let greeting = second
        .send(json!({"type": "name", "sessionID": id, "value": "Bo"}))
        .await;
    assert_eq!(greeting.kind, ResponseType::Greeting);
    assert!(second.is_closed().await);
}

#[tokio::test]
async fn errors_keep_the_connection_open() {
    let (addr, _state, _stop) =
        spawn_server(ConnectionMode::Persistent, Arc::new(MemoryScoreStore::new())).await;
    let mut client = Client::connect(addr).await;

    let missing_type = client.send(json!({"sessionId": "x"})).await;
    assert_eq!(missing_type.kind, ResponseType::Error);
    assert!(!missing_type.ok);

    let unknown_session = client
        .send(json!({"type": "game", "sessionId": "nope", "command": "next"}))
        .await;
    assert_eq!(unknown_session.kind, ResponseType::Error);

    let unknown_type = client.send(json!({"type": "dance"})).await;
    assert!(unknown_type.message.unwrap().contains("dance"));

    let hello = client.send(json!({"type": "start"})).await;
    assert!(hello.ok);
}

#[tokio::test]
async fn leaderboard_survives_a_restart() {
    let path = std::env::temp_dir().join(format!("movie-quiz-{}.json", Uuid::new_v4()));
    let store = Arc::new(JsonFileScoreStore::new(path.clone()));
    store
        .save(vec![ScoreRecord::new("Zed@10.0.0.1", 42.0)])
        .await
        .unwrap();

    let (addr, _state, stop) = spawn_server(ConnectionMode::Persistent, store.clone()).await;
    let mut client = Client::connect(addr).await;
    let id = client
        .send(json!({"type": "start"}))
        .await
        .session_id
        .unwrap();
    let board = client
        .send(json!({"type": "game", "sessionId": id, "command": "leaderboard"}))
        .await;
    assert_eq!(board.kind, ResponseType::Leaderboard);
    assert_eq!(board.leaderboard.as_deref(), Some("Zed@10.0.0.1: 42.00"));

    client
        .send(json!({"type": "game", "sessionId": id, "command": "quit"}))
        .await;
    let _ = stop.send(());

    let reloaded = Leaderboard::load(store).await.unwrap();
    let keys: Vec<_> = reloaded
        .entries()
        .await
        .into_iter()
        .map(|record| record.player_key)
        .collect();
    assert_eq!(keys, vec!["Zed@10.0.0.1", "anonymous@127.0.0.1"]);

    let _ = tokio::fs::remove_file(path).await;
}
