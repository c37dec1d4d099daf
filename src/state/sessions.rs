use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::state::game::GameState;

/// Opaque token identifying a session on the wire.
pub type SessionId = String;

/// Stored game state alongside the last time a request touched it.
#[derive(Debug)]
pub struct SessionSlot {
    /// Current game state.
    pub state: GameState,
    /// Last time a request locked the session.
    pub last_seen: Instant,
}

/// Exclusive access to one session for the duration of a request.
///
/// Holding the guard serializes requests against the same session id, even when they
/// arrive on different connections.
pub struct SessionGuard {
    id: SessionId,
    slot: OwnedMutexGuard<SessionSlot>,
}

impl SessionGuard {
    /// Id of the locked session.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy of the stored state, to be mutated and written back with [`Self::commit`].
    pub fn snapshot(&self) -> GameState {
        self.slot.state.clone()
    }

    /// Write the mutated state back into the store.
    pub fn commit(&mut self, state: GameState) {
        self.slot.state = state;
    }
}

/// In-memory registry of game sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<SessionSlot>>>,
}

impl SessionStore {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `state` under a freshly generated session id.
    pub fn create(&self, state: GameState) -> SessionId {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Arc::new(Mutex::new(SessionSlot {
                state,
                last_seen: Instant::now(),
            })),
        );
        id
    }

    /// Copy of the state stored for `id`.
    pub async fn get(&self, id: &str) -> Option<GameState> {
        let slot = self.slot(id)?;
        let guard = slot.lock().await;
        Some(guard.state.clone())
    }

    /// Replace the state stored for `id`. Returns `false` if the session does not exist.
    pub async fn save(&self, id: &str, state: GameState) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let mut guard = slot.lock().await;
        guard.state = state;
        guard.last_seen = Instant::now();
        true
    }

    /// Acquire exclusive access to a session, refreshing its last access time.
    pub async fn lock(&self, id: &str) -> Option<SessionGuard> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock_owned().await;
        guard.last_seen = Instant::now();
        Some(SessionGuard {
            id: id.to_string(),
            slot: guard,
        })
    }

    /// Forget a session; unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than `ttl`, returning how many were removed.
    ///
    /// Sessions locked by an in-flight request are kept.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| match slot.try_lock() {
            Ok(guard) => guard.last_seen.elapsed() <= ttl,
            Err(_) => true,
        });
        before.saturating_sub(self.sessions.len())
    }

    fn slot(&self, id: &str) -> Option<Arc<Mutex<SessionSlot>>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{catalog::Movie, game::GameLength};

    fn sample_state() -> GameState {
        let mut state = GameState::new();
        state.register("Ann").unwrap();
        state
            .begin(GameLength::Long, Movie::new("Jaws", "Jaws"), 42)
            .unwrap();
        state
    }

    #[tokio::test]
    async fn get_returns_what_was_created() {
        let store = SessionStore::new();
        let state = sample_state();
        let id = store.create(state.clone());
        assert_eq!(store.get(&id).await, Some(state));
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = SessionStore::new();
        let a = store.create(GameState::new());
        let b = store.create(GameState::new());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn unknown_sessions_are_absent() {
        let store = SessionStore::new();
        assert!(store.get("nope").await.is_none());
        assert!(store.lock("nope").await.is_none());
        assert!(!store.save("nope", GameState::new()).await);
    }

    #[tokio::test]
    async fn committed_state_is_visible_after_the_guard_drops() {
        let store = SessionStore::new();
        let id = store.create(GameState::new());
        {
            let mut guard = store.lock(&id).await.unwrap();
            let mut state = guard.snapshot();
            state.register("Bob").unwrap();
            guard.commit(state);
        }
        assert_eq!(store.get(&id).await.unwrap().player_name, "Bob");
    }

    #[tokio::test]
    async fn uncommitted_changes_are_discarded() {
        let store = SessionStore::new();
        let id = store.create(GameState::new());
        {
            let guard = store.lock(&id).await.unwrap();
            let mut state = guard.snapshot();
            state.register("Bob").unwrap();
        }
        assert_eq!(store.get(&id).await.unwrap().player_name, "");
    }

    #[tokio::test]
    async fn remove_forgets_the_session() {
        let store = SessionStore::new();
        let id = store.create(GameState::new());
        store.remove(&id);
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn sweep_drops_idle_sessions_only() {
        let store = SessionStore::new();
        let idle = store.create(GameState::new());
        tokio::time::sleep(Duration::from_millis(30)).await;
        let fresh = store.create(GameState::new());

        let removed = store.sweep_idle(Duration::from_millis(15));
        assert_eq!(removed, 1);
        assert!(store.get(&idle).await.is_none());
        assert!(store.get(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn sweep_keeps_locked_sessions() {
        let store = SessionStore::new();
        let id = store.create(GameState::new());
        let guard = store.lock(&id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.sweep_idle(Duration::from_millis(1)), 0);
        drop(guard);
        assert_eq!(store.sweep_idle(Duration::from_millis(1)), 1);
    }
}
