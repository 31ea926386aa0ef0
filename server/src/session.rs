//! Player session storage for the hangman server
//!
//! This module keeps everything the server remembers about a browser between
//! requests:
//! - The typed [`PlayerSession`] record (identity, active game, word batches)
//! - The bincode codec that turns that record into stored bytes and back
//! - Per-session locking so concurrent requests for one player run one at a time
//! - Idle expiry and capacity limits
//!
//! Handlers never touch the stored bytes directly. They lock a slot, `load` the
//! record, mutate it and `store` it back while still holding the lock.

use log::{error, info};
use serde::{Deserialize, Serialize};
use shared::{Difficulty, GameSession, WordBatchCache};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Who is playing and how they asked to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub level: Difficulty,
    pub prepopulate: bool,
}

/// Everything stored for one browser session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub player: Option<Player>,
    pub game: Option<GameSession>,
    pub word_batches: WordBatchCache,
}

impl PlayerSession {
    /// Records a (new) identity and drops any game in progress.
    ///
    /// The next secret is drawn lazily when the board is first requested.
    pub fn begin(&mut self, player: Player) {
        self.player = Some(player);
        self.game = None;
    }

    /// Forgets the current game but keeps the player and their word batches.
    pub fn reset_game(&mut self) {
        self.game = None;
    }
}

/// Stored form of a session plus its activity timestamp.
#[derive(Debug)]
pub struct SessionSlot {
    data: Vec<u8>,
    last_seen: Instant,
}

impl SessionSlot {
    fn new() -> Result<Self, bincode::Error> {
        Ok(Self {
            data: bincode::serialize(&PlayerSession::default())?,
            last_seen: Instant::now(),
        })
    }

    /// Decodes the stored record and marks the session as active.
    pub fn load(&mut self) -> Result<PlayerSession, bincode::Error> {
        self.last_seen = Instant::now();
        bincode::deserialize(&self.data)
    }

    /// Encodes `session` as the new stored record.
    pub fn store(&mut self, session: &PlayerSession) -> Result<(), bincode::Error> {
        self.data = bincode::serialize(session)?;
        self.last_seen = Instant::now();
        Ok(())
    }

    /// Checks if the session has been idle longer than `timeout`
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Shared handle to one session. Holding its lock serializes that player's requests.
pub type SessionHandle = Arc<Mutex<SessionSlot>>;

/// All live sessions indexed by their cookie id.
pub struct SessionStore {
    slots: HashMap<String, SessionHandle>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            slots: HashMap::new(),
            max_sessions,
            idle_timeout,
        }
    }

    /// Opens an empty session under a fresh random id.
    ///
    /// Returns None if the store is at capacity.
    pub fn create(&mut self) -> Option<(String, SessionHandle)> {
        if self.slots.len() >= self.max_sessions {
            return None;
        }

        let id = Uuid::new_v4().simple().to_string();
        let slot = match SessionSlot::new() {
            Ok(slot) => Arc::new(Mutex::new(slot)),
            Err(e) => {
                error!("Failed to encode empty session: {}", e);
                return None;
            }
        };
        info!("Session {} opened", id);
        self.slots.insert(id.clone(), Arc::clone(&slot));

        Some((id, slot))
    }

    /// Looks up a live session by id.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.slots.get(id).cloned()
    }

    /// Drops a session. Returns false if it was already gone.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.slots.remove(id).is_some() {
            info!("Session {} closed", id);
            true
        } else {
            false
        }
    }

    /// Removes sessions idle for longer than the configured timeout
    ///
    /// Sessions whose lock is currently held are serving a request and are
    /// never expired. Returns the removed ids.
    pub fn check_timeouts(&mut self) -> Vec<String> {
        let timeout = self.idle_timeout;
        let expired: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| {
                slot.try_lock()
                    .map(|slot| slot.is_timed_out(timeout))
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            self.slots.remove(id);
            info!("Session {} expired", id);
        }

        expired
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player {
            name: "alice".to_string(),
            level: Difficulty::new(3).unwrap(),
            prepopulate: false,
        }
    }

    #[test]
    fn test_store_creation() {
        let store = SessionStore::new(5, Duration::from_secs(60));
        assert_eq!(store.max_sessions, 5);
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_create_and_get() {
        let mut store = SessionStore::new(2, Duration::from_secs(60));
        let (id, _) = store.create().unwrap();

        assert_eq!(id.len(), 32);
        assert!(store.get(&id).is_some());
        assert!(store.get("unknown").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = SessionStore::new(3, Duration::from_secs(60));
        let (first, _) = store.create().unwrap();
        let (second, _) = store.create().unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_at_capacity() {
        let mut store = SessionStore::new(1, Duration::from_secs(60));
        assert!(store.create().is_some());
        assert!(store.create().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut store = SessionStore::new(2, Duration::from_secs(60));
        let (id, _) = store.create().unwrap();

        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_new_slot_loads_empty_session() {
        let mut store = SessionStore::new(2, Duration::from_secs(60));
        let (_, handle) = store.create().unwrap();
        let mut slot = handle.try_lock().unwrap();
        assert_eq!(slot.load().unwrap(), PlayerSession::default());
    }

    #[test]
    fn test_slot_keeps_game_between_requests() {
        let mut store = SessionStore::new(2, Duration::from_secs(60));
        let (id, handle) = store.create().unwrap();

        {
            let mut slot = handle.try_lock().unwrap();
            let mut session = slot.load().unwrap();
            session.begin(player());
            let mut game = GameSession::new("cat", 6).unwrap();
            game.submit_guess("z").unwrap();
            session.game = Some(game);
            slot.store(&session).unwrap();
        }

        let handle = store.get(&id).unwrap();
        let mut slot = handle.try_lock().unwrap();
        let session = slot.load().unwrap();
        let game = session.game.unwrap();
        assert_eq!(session.player, Some(player()));
        assert_eq!(game.guesses_remaining(), 5);
        assert!(game.missed().contains("z"));
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut session = PlayerSession::default();
        session.begin(player());
        session.game = Some(GameSession::new("cat", 6).unwrap());

        session.reset_game();
        assert!(session.game.is_none());
        assert_eq!(session.player, Some(player()));
    }

    #[test]
    fn test_begin_drops_previous_game() {
        let mut session = PlayerSession::default();
        session.game = Some(GameSession::new("cat", 6).unwrap());
        session.begin(player());
        assert!(session.game.is_none());
    }

    #[test]
    fn test_slot_timeout() {
        let mut slot = SessionSlot::new().unwrap();
        assert!(!slot.is_timed_out(Duration::from_secs(1)));

        slot.last_seen = Instant::now() - Duration::from_secs(2);
        assert!(slot.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_check_timeouts_removes_idle_sessions() {
        let mut store = SessionStore::new(3, Duration::from_secs(1));
        let (idle, idle_handle) = store.create().unwrap();
        let (active, _) = store.create().unwrap();

        idle_handle.try_lock().unwrap().last_seen = Instant::now() - Duration::from_secs(5);

        let expired = store.check_timeouts();
        assert_eq!(expired, vec![idle.clone()]);
        assert!(store.get(&idle).is_none());
        assert!(store.get(&active).is_some());
    }

    #[test]
    fn test_check_timeouts_skips_locked_sessions() {
        let mut store = SessionStore::new(3, Duration::from_secs(1));
        let (id, handle) = store.create().unwrap();

        let mut guard = handle.try_lock().unwrap();
        guard.last_seen = Instant::now() - Duration::from_secs(5);

        assert!(store.check_timeouts().is_empty());
        drop(guard);
        assert_eq!(store.check_timeouts(), vec![id]);
    }
}
