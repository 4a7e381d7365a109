//! Per-session negotiation state
//!
//! A [`Session`] holds one side of an offer/answer exchange while the
//! counterpart has not arrived yet. All mutable state lives behind a
//! single per-session lock; nothing is shared across sessions.

use crate::error::{Error, Result};
use crate::message::{SdpOffer, SessionDescription};
use std::collections::{HashMap, VecDeque};
use tokio::time::Instant;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info};

/// Session identifier
pub type SessionId = String;

/// Negotiation state machine
///
/// `Closed` is terminal: a closed session id is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No offers stored yet
    Empty,
    /// One side's offer stored, waiting for the counterpart
    AwaitingPeer,
    /// Both sides matched; answer delivered to at least one side
    Paired,
    /// Torn down explicitly or by the idle timer
    Closed,
}

/// Reply delivered to a parked request
pub(crate) type PairingReply = Result<SessionDescription>;

/// A subscriber parked while no publisher offer is stored
#[derive(Debug)]
pub(crate) struct PendingSubscriber {
    /// Subscriber peer id
    pub peer_id: String,
    /// The subscriber's local description
    pub description: SessionDescription,
    /// Channel resolving the subscriber's held request
    pub reply: oneshot::Sender<PairingReply>,
}

/// Mutable session state, guarded by the session lock
#[derive(Debug)]
pub(crate) struct SessionInner {
    /// Current state machine position
    pub state: SessionState,
    /// The publisher's stored offer, at most one per session
    pub publisher: Option<SdpOffer>,
    /// Channel resolving the publisher's held request
    pub publisher_waiter: Option<oneshot::Sender<PairingReply>>,
    /// Subscribers parked before any publisher arrived, FIFO
    pub pending: VecDeque<PendingSubscriber>,
    /// Answers already delivered, keyed by peer id, for idempotent
    /// resubmission
    pub answered: HashMap<String, SessionDescription>,
    /// Last time any signaling message touched this session
    pub last_activity: Instant,
}

/// A single publisher/subscriber negotiation session
#[derive(Debug)]
pub struct Session {
    session_id: SessionId,
    created_at: Instant,
    pub(crate) inner: Mutex<SessionInner>,
}

impl Session {
    /// Create a new, empty session
    pub fn new(session_id: SessionId) -> Self {
        info!(session = %session_id, "creating session");

        Self {
            session_id,
            created_at: Instant::now(),
            inner: Mutex::new(SessionInner {
                state: SessionState::Empty,
                publisher: None,
                publisher_waiter: None,
                pending: VecDeque::new(),
                answered: HashMap::new(),
                last_activity: Instant::now(),
            }),
        }
    }

    /// Get the session id
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// When the session was created
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Current state machine position
    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Last time any signaling message touched this session
    pub async fn last_activity(&self) -> Instant {
        self.inner.lock().await.last_activity
    }

    /// Number of subscribers currently parked
    pub async fn pending_subscribers(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    /// Close the session, resolving every parked request with `reason`
    ///
    /// Idempotent: closing a closed session is a no-op.
    pub async fn close(&self, reason: Error) {
        let mut inner = self.inner.lock().await;
        close_locked(&mut inner, &self.session_id, reason);
    }

    /// Close the session only if it is still waiting for a counterpart
    ///
    /// Check and close happen under one lock acquisition, so a pairing
    /// that raced in between is never torn down. Returns whether the
    /// session was closed.
    pub async fn close_if_awaiting(&self, reason: Error) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::AwaitingPeer {
            return false;
        }

        close_locked(&mut inner, &self.session_id, reason);
        true
    }
}

/// Close a session whose lock is already held
pub(crate) fn close_locked(inner: &mut SessionInner, session_id: &str, reason: Error) {
    if inner.state == SessionState::Closed {
        return;
    }

    info!(session = %session_id, reason = reason.kind(), "closing session");
    inner.state = SessionState::Closed;
    inner.last_activity = Instant::now();

    if let Some(waiter) = inner.publisher_waiter.take() {
        // The requester may already be gone; nothing to do then
        let _ = waiter.send(Err(reason.clone()));
    }

    for pending in inner.pending.drain(..) {
        let _ = pending.reply.send(Err(reason.clone()));
    }
}

/// Drop parked subscribers whose requester disconnected
pub(crate) fn evict_disconnected(inner: &mut SessionInner, session_id: &str) {
    let before = inner.pending.len();
    inner.pending.retain(|pending| !pending.reply.is_closed());

    let evicted = before - inner.pending.len();
    if evicted > 0 {
        debug!(session = %session_id, evicted, "evicted disconnected subscribers");
    }
}
