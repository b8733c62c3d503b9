use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::ChatMessage;
use crate::prompts::{DOCTOR_SYSTEM_PROMPT, GREETING};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            messages: vec![
                ChatMessage::system(DOCTOR_SYSTEM_PROMPT),
                ChatMessage::assistant(GREETING),
            ],
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.last_active_at = Utc::now();
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
}

/// One live session. `turn` serializes conversation turns and may be held
/// across provider calls; `state` guards the message list and is only held
/// for in-memory reads and writes.
#[derive(Debug)]
pub struct SessionEntry {
    turn: tokio::sync::Mutex<()>,
    state: Mutex<Session>,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        Self {
            turn: tokio::sync::Mutex::new(()),
            state: Mutex::new(session),
        }
    }

    /// Waits until no other turn is running on this session.
    pub async fn begin_turn(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    pub fn is_busy(&self) -> bool {
        self.turn.try_lock().is_err()
    }

    pub fn snapshot(&self) -> Session {
        self.with_session(|session| session.clone())
    }

    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut session = self
            .state
            .lock()
            .expect("session mutex should not be poisoned");
        f(&mut session)
    }
}

pub type SessionHandle = Arc<SessionEntry>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> Session {
        let (_, session) = self.insert_new(Utc::now());
        session
    }

    /// Current messages of a session. Never waits for an in-flight turn.
    pub fn get(&self, session_id: &str) -> Result<Session, SessionError> {
        Ok(self.handle(session_id)?.snapshot())
    }

    pub fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        let removed = self
            .sessions
            .lock()
            .expect("session map mutex should not be poisoned")
            .remove(session_id);

        match removed {
            Some(_) => {
                info!(session_id = %session_id, "session deleted");
                Ok(())
            }
            None => Err(SessionError::NotFound),
        }
    }

    /// Appends outside of a conversation turn; waits for any running turn.
    pub async fn append(&self, session_id: &str, message: ChatMessage) -> Result<(), SessionError> {
        let handle = self.handle(session_id)?;
        let _turn = handle.begin_turn().await;
        handle.with_session(|session| session.push(message));
        Ok(())
    }

    pub fn handle(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .lock()
            .expect("session map mutex should not be poisoned")
            .get(session_id)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    /// Looks up `session_id`, starting a fresh session when it is absent or unknown.
    pub fn resolve_or_create(&self, session_id: Option<&str>) -> (String, SessionHandle) {
        if let Some(session_id) = session_id.map(str::trim).filter(|id| !id.is_empty())
            && let Ok(handle) = self.handle(session_id)
        {
            return (session_id.to_string(), handle);
        }

        let (handle, session) = self.insert_new(Utc::now());
        (session.id, handle)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session map mutex should not be poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops sessions idle since before `now - idle_ttl`. Sessions with a
    /// turn in progress are always kept.
    pub fn purge_idle_at(&self, now: DateTime<Utc>, idle_ttl: Duration) -> usize {
        let Ok(idle_ttl) = chrono::Duration::from_std(idle_ttl) else {
            return 0;
        };
        let Some(cutoff) = now.checked_sub_signed(idle_ttl) else {
            return 0;
        };

        let mut sessions = self
            .sessions
            .lock()
            .expect("session map mutex should not be poisoned");
        let before = sessions.len();

        sessions.retain(|session_id, handle| {
            if handle.is_busy() {
                return true;
            }
            let keep = handle.with_session(|session| session.last_active_at > cutoff);
            if !keep {
                debug!(session_id = %session_id, "evicting idle session");
            }
            keep
        });

        before - sessions.len()
    }

    pub fn spawn_idle_purger(
        &self,
        idle_ttl: Duration,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = store.purge_idle_at(Utc::now(), idle_ttl);
                if purged > 0 {
                    info!(
                        purged,
                        remaining = store.len(),
                        "idle session purge tick"
                    );
                } else {
                    debug!("idle session purge tick found no idle sessions");
                }
            }
        })
    }

    fn insert_new(&self, now: DateTime<Utc>) -> (SessionHandle, Session) {
        let session = Session::new(Uuid::new_v4().to_string(), now);
        let handle = Arc::new(SessionEntry::new(session.clone()));

        self.sessions
            .lock()
            .expect("session map mutex should not be poisoned")
            .insert(session.id.clone(), Arc::clone(&handle));

        info!(session_id = %session.id, "session created");
        (handle, session)
    }
}
