//! Thread-safe session registry
//!
//! The registry map carries its own lock, separate from the per-session
//! locks: insertion and lookup never contend with in-session pairing.

use super::session::{Session, SessionId};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Registry of live sessions, keyed by session id
pub struct SessionRegistry {
    /// Active sessions
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,

    /// Maximum number of concurrent sessions (0 = unlimited)
    max_sessions: usize,
}

impl SessionRegistry {
    /// Create a new registry
    ///
    /// # Arguments
    ///
    /// * `max_sessions` - Maximum number of concurrent sessions (0 = unlimited)
    pub fn new(max_sessions: usize) -> Self {
        info!(max_sessions, "creating session registry");

        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
        }
    }

    /// Fetch a session, creating it if absent
    ///
    /// Insertion is idempotent: concurrent callers for the same id all
    /// receive the same entry.
    pub async fn get_or_create(&self, session_id: &str) -> Result<Arc<Session>> {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(session_id) {
            return Ok(existing.clone());
        }

        if self.max_sessions > 0 && sessions.len() >= self.max_sessions {
            return Err(Error::Capacity(format!(
                "maximum number of sessions reached ({})",
                self.max_sessions
            )));
        }

        let session = Arc::new(Session::new(session_id.to_string()));
        sessions.insert(session_id.to_string(), session.clone());

        Ok(session)
    }

    /// Look up an existing session
    pub async fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Remove a session
    ///
    /// Fails with [`Error::NotFound`] on an unknown id; callers treat
    /// that as non-fatal and log it.
    pub async fn remove(&self, session_id: &str) -> Result<()> {
        let removed = self.sessions.write().await.remove(session_id);

        match removed {
            Some(_) => {
                debug!(session = %session_id, "removed session");
                Ok(())
            }
            None => Err(Error::NotFound(format!("unknown session: {session_id}"))),
        }
    }

    /// Snapshot of all live sessions, for the sweeper
    pub async fn snapshot(&self) -> Vec<Arc<Session>> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
