//! The set of sessions currently in the room.
//!
//! One lock guards everything. Broadcasts iterate with the lock held, so a
//! broadcast sees exactly the sessions present when it starts and no join,
//! leave or other broadcast interleaves with it. The lock is never held
//! across an `.await`.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::RegistryError;
use crate::network::SessionExit;

use super::{Session, SessionId, SessionIdGenerator};

/// Thread-safe collection of active sessions, ordered by registration.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
    ids: SessionIdGenerator,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: BTreeMap<SessionId, Session>,
    /// Set by `remove_all`; a closed registry admits nobody.
    closed: bool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id and insert the session built for it.
    ///
    /// Allocation happens under the lock, so iteration order is exactly
    /// registration order.
    pub fn register<F>(&self, build: F) -> Result<SessionId, RegistryError>
    where
        F: FnOnce(SessionId) -> Session,
    {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(RegistryError::Closed);
        }
        let id = self.ids.next();
        if inner.sessions.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        inner.sessions.insert(id, build(id));
        Ok(id)
    }

    /// Insert a session built elsewhere.
    pub fn insert(&self, session: Session) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(RegistryError::Closed);
        }
        let id = session.id();
        if inner.sessions.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        inner.sessions.insert(id, session);
        Ok(())
    }

    /// Remove one session, handing ownership to the caller.
    ///
    /// Returns `None` if it was already removed; only one caller can ever
    /// receive a given session.
    pub fn remove(&self, id: SessionId) -> Option<Session> {
        self.inner.lock().sessions.remove(&id)
    }

    /// Detach every session in registration order and close the registry.
    pub fn remove_all(&self) -> Vec<Session> {
        let mut inner = self.inner.lock();
        inner.closed = true;
        std::mem::take(&mut inner.sessions).into_values().collect()
    }

    /// Run `f` on every session while holding the lock for the whole pass.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Session),
    {
        let inner = self.inner.lock();
        for session in inner.sessions.values() {
            f(session);
        }
    }

    /// Store the worker handle on a registered session.
    ///
    /// Hands the handle back if the session is no longer registered.
    pub fn attach_worker(
        &self,
        id: SessionId,
        handle: JoinHandle<SessionExit>,
    ) -> Result<(), JoinHandle<SessionExit>> {
        match self.inner.lock().sessions.get_mut(&id) {
            Some(session) => {
                session.set_worker(handle);
                Ok(())
            }
            None => Err(handle),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().sessions.is_empty()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.inner.lock().sessions.contains_key(&id)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Snapshot of declared names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .lock()
            .sessions
            .values()
            .map(|s| s.name().to_owned())
            .collect()
    }
}
