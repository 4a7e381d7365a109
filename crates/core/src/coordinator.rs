//! Negotiation coordinator
//!
//! Orchestrates the handshake sequence: submits offers through the
//! exchange handler, holds parked requests under the pairing timeout,
//! applies explicit close signals and runs the background idle sweeper.
//! Timeouts are never retried here; retry is a client responsibility.

use crate::config::SignalingConfig;
use crate::error::{Error, Result};
use crate::exchange::{self, Outcome};
use crate::message::{Role, SessionDescription};
use crate::session::{close_locked, evict_disconnected, SessionRegistry, SessionState};
use std::sync::Arc;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Coordinates offer/answer negotiation across all sessions
pub struct Coordinator {
    registry: SessionRegistry,
    config: SignalingConfig,
}

impl Coordinator {
    /// Create a coordinator from a validated configuration
    pub fn new(config: SignalingConfig) -> Self {
        Self {
            registry: SessionRegistry::new(config.max_sessions),
            config,
        }
    }

    /// The session registry
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The active configuration
    pub fn config(&self) -> &SignalingConfig {
        &self.config
    }

    /// Submit an offer and wait for the paired remote description
    ///
    /// Resolves immediately when the counterpart is already stored.
    /// Otherwise the call suspends until the counterpart arrives, the
    /// pairing timeout fires ([`Error::Timeout`], session closed) or
    /// the session is closed explicitly ([`Error::Gone`]).
    pub async fn submit(
        &self,
        session_id: &str,
        peer_id: &str,
        role: Role,
        description: SessionDescription,
    ) -> Result<SessionDescription> {
        let session = self.registry.get_or_create(session_id).await?;

        match exchange::submit(&session, role, peer_id, description).await? {
            Outcome::Answer(answer) => Ok(answer),
            Outcome::Pending(reply_rx) => {
                match tokio::time::timeout(self.config.pairing_timeout(), reply_rx).await {
                    Ok(Ok(reply)) => reply,
                    // Session torn down without resolving this waiter
                    Ok(Err(_)) => Err(Error::Timeout(format!(
                        "session {session_id}: counterpart never arrived"
                    ))),
                    // Local timer fired before the sweeper got there;
                    // a pairing that won the race is left alone
                    Err(_) => {
                        let reason =
                            Error::Timeout(format!("session {session_id}: counterpart never arrived"));
                        session.close_if_awaiting(reason.clone()).await;
                        Err(reason)
                    }
                }
            }
        }
    }

    /// Apply an explicit close signal to a session
    ///
    /// Moves the session to `Closed` from any state and resolves every
    /// parked request with [`Error::Gone`]. The tombstone is removed by
    /// a later sweep so that the id keeps rejecting with `Gone` in the
    /// meantime.
    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        let session = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("unknown session: {session_id}")))?;

        session
            .close(Error::Gone(format!("session {session_id} closed")))
            .await;

        Ok(())
    }

    /// Spawn the background idle sweeper
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        info!(
            interval_ms = coordinator.config.sweep_interval_ms,
            "starting idle sweeper"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coordinator.config.sweep_interval());
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                coordinator.sweep().await;
            }
        })
    }

    /// One sweep pass over all sessions
    ///
    /// - Sessions idle in `AwaitingPeer` past the pairing timeout are
    ///   closed; still-parked requests resolve with [`Error::Timeout`].
    /// - Parked subscribers whose requester disconnected are evicted.
    /// - Sessions already terminal (`Closed`, `Paired`) or never used
    ///   (`Empty`) are removed once idle past the timeout.
    pub async fn sweep(&self) {
        let timeout = self.config.pairing_timeout();
        let now = Instant::now();
        let mut expired = Vec::new();

        for session in self.registry.snapshot().await {
            let mut inner = session.inner.lock().await;
            let idle = now.saturating_duration_since(inner.last_activity);

            match inner.state {
                SessionState::AwaitingPeer if idle >= timeout => {
                    close_locked(
                        &mut inner,
                        session.session_id(),
                        Error::Timeout(format!(
                            "session {}: counterpart never arrived",
                            session.session_id()
                        )),
                    );
                }
                SessionState::AwaitingPeer => {
                    evict_disconnected(&mut inner, session.session_id());
                }
                SessionState::Closed | SessionState::Paired | SessionState::Empty
                    if idle >= timeout =>
                {
                    expired.push(session.session_id().to_string());
                }
                _ => {}
            }
        }

        for session_id in expired {
            debug!(session = %session_id, "sweeping idle session");
            if let Err(e) = self.registry.remove(&session_id).await {
                // Raced with another remover; non-fatal
                warn!(session = %session_id, error = %e, "sweep remove failed");
            }
        }
    }
}
