use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::session::state::{AppPhase, Session, SessionError};

/// One session behind its own lock, so work on different sessions never contends.
pub type SharedSession = Arc<Mutex<Session>>;

struct Entry {
    session: SharedSession,
    /// Last time a request looked the session up. Drives idle eviction.
    last_seen: Instant,
}

/// In-memory registry of live sessions. Nothing is persisted; a restart starts empty.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionStore {
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.inner.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, session)
    }

    /// Looks a session up and marks it as seen.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Drops a session. Refused while an analysis is running so the in-flight chain
    /// always has a session to resolve into.
    pub async fn remove(&self, id: Uuid) -> Result<bool, SessionError> {
        let mut sessions = self.inner.write().await;
        let Some(entry) = sessions.get(&id) else {
            return Ok(false);
        };
        if entry.session.lock().await.phase() == AppPhase::Analyzing {
            return Err(SessionError::Busy);
        }
        sessions.remove(&id);
        Ok(true)
    }

    /// Drops every session not seen for at least `ttl`. Sessions that are analyzing or
    /// currently locked by a request are kept. Returns the number evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            if entry.last_seen.elapsed() < ttl {
                return true;
            }
            match entry.session.try_lock() {
                Ok(session) => session.phase() == AppPhase::Analyzing,
                Err(_) => true,
            }
        });
        before - sessions.len()
    }

    /// Runs `evict_idle` every `every` until the runtime shuts down.
    pub fn spawn_evictor(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle session(s); {} active",
                        store.len().await
                    );
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
