//! Process-wide session state.
//!
//! A [`SessionStore`] holds at most one [`Session`] and mirrors it into a
//! [`SessionPersistence`] backend. Reads go through [`SessionStore::current`];
//! writes happen only through [`SessionGuard`] (sign-in, sign-out, and
//! teardown after an unauthorized response).

mod guard;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use guard::SessionGuard;

/// Profile cached alongside the credential at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Bearer credential plus cached profile.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub profile: UserProfile,
    /// Unix seconds when the session was established
    pub established_at: i64,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            token: token.into(),
            profile,
            established_at: chrono::Utc::now().timestamp(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("profile", &self.profile)
            .field("established_at", &self.established_at)
            .finish()
    }
}

/// Durable storage for the current session (keychain, file, memory).
pub trait SessionPersistence: Send + Sync + 'static {
    fn load_session(&self) -> Result<Option<Session>>;
    fn save_session(&self, session: &Session) -> Result<()>;
    /// Must succeed when nothing is stored.
    fn clear_session(&self) -> Result<()>;
}

/// Non-durable persistence, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> Result<Option<Session>> {
        Ok(self.slot().clone())
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        self.slot().take();
        Ok(())
    }
}

#[derive(Default)]
struct SessionSlot {
    current: Option<Session>,
    /// Bumped on every establish/clear so stale teardown requests can be told apart.
    generation: u64,
}

/// Shared handle to the single active session.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct SessionStore {
    persistence: Arc<dyn SessionPersistence>,
    slot: Arc<Mutex<SessionSlot>>,
}

impl SessionStore {
    /// Empty store writing through to `persistence`.
    pub fn new(persistence: impl SessionPersistence) -> Self {
        Self {
            persistence: Arc::new(persistence),
            slot: Arc::new(Mutex::new(SessionSlot::default())),
        }
    }

    /// Store seeded from whatever `persistence` already holds.
    pub fn restore(persistence: impl SessionPersistence) -> Result<Self> {
        let store = Self::new(persistence);
        let restored = store.persistence.load_session()?;
        if restored.is_some() {
            tracing::debug!("Restored persisted session");
        }
        store.slot().current = restored;
        Ok(store)
    }

    /// In-memory store with no session.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::default())
    }

    pub fn current(&self) -> Option<Session> {
        self.slot().current.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.slot().current.is_some()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.slot()
            .current
            .as_ref()
            .map(|session| session.profile.clone())
    }

    fn slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Token and generation read under one lock.
    fn lease(&self) -> Option<(String, u64)> {
        let slot = self.slot();
        slot.current
            .as_ref()
            .map(|session| (session.token.clone(), slot.generation))
    }

    fn establish(&self, session: Session) -> Result<()> {
        self.persistence.save_session(&session)?;
        let mut slot = self.slot();
        slot.current = Some(session);
        slot.generation += 1;
        Ok(())
    }

    /// Clears the session unconditionally. Returns whether one was present.
    fn clear(&self) -> Result<bool> {
        let had_session = {
            let mut slot = self.slot();
            slot.generation += 1;
            slot.current.take().is_some()
        };
        self.persistence.clear_session()?;
        Ok(had_session)
    }

    /// Clears the session only if it is still the one issued at `generation`.
    ///
    /// Returns `true` for the single caller that performed the teardown.
    fn clear_if_current(&self, generation: u64) -> bool {
        {
            let mut slot = self.slot();
            if slot.generation != generation || slot.current.is_none() {
                return false;
            }
            slot.current = None;
            slot.generation += 1;
        }
        if let Err(error) = self.persistence.clear_session() {
            tracing::warn!("Failed to clear persisted session: {}", error);
        }
        true
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot();
        formatter
            .debug_struct("SessionStore")
            .field("current", &slot.current)
            .field("generation", &slot.generation)
            .finish_non_exhaustive()
    }
}
