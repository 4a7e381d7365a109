//! SDP exchange protocol handler
//!
//! Validates incoming offers and pairs publishers with subscribers
//! inside a session. Pairing is FIFO per session: subscribers that
//! arrive before any publisher are queued and drained, in submission
//! order, when the publisher's offer lands.

use crate::error::{Error, Result};
use crate::message::{Role, SdpOffer, SessionDescription};
use crate::session::{
    evict_disconnected, PairingReply, PendingSubscriber, Session, SessionInner, SessionState,
};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info};

/// Outcome of an offer submission
#[derive(Debug)]
pub enum Outcome {
    /// The counterpart was already present; the answer resolved
    /// immediately
    Answer(SessionDescription),

    /// Parked until the counterpart arrives, the idle timer fires, or
    /// the session closes
    Pending(oneshot::Receiver<PairingReply>),
}

/// Submit an offer to a session
///
/// Rules:
/// - Publisher, none stored: store the offer. Queued subscribers are
///   drained FIFO and the first one's description becomes the
///   publisher's answer; with an empty queue the publisher is parked.
/// - Publisher, one already stored: [`Error::Conflict`], always.
/// - Subscriber, publisher stored: answer with the publisher's
///   description and notify the publisher's held request, if still open.
/// - Subscriber, no publisher: park FIFO. Resubmission from the same
///   peer replaces its previous entry in place, keeping its position.
/// - Subscriber already answered: the same answer again (idempotent).
/// - Closed session: [`Error::Gone`] for both roles.
pub async fn submit(
    session: &Session,
    role: Role,
    peer_id: &str,
    description: SessionDescription,
) -> Result<Outcome> {
    description.validate()?;

    let mut inner = session.inner.lock().await;
    inner.last_activity = Instant::now();

    if inner.state == SessionState::Closed {
        return Err(Error::Gone(format!(
            "session {} already closed",
            session.session_id()
        )));
    }

    match role {
        Role::Publisher => submit_publisher(session, &mut inner, peer_id, description),
        Role::Subscriber => submit_subscriber(session, &mut inner, peer_id, description),
    }
}

fn submit_publisher(
    session: &Session,
    inner: &mut SessionInner,
    peer_id: &str,
    description: SessionDescription,
) -> Result<Outcome> {
    if inner.publisher.is_some() {
        return Err(Error::Conflict(format!(
            "session {} already has a publisher",
            session.session_id()
        )));
    }

    let publisher_sd = description.clone();
    inner.publisher = Some(SdpOffer::new(peer_id, Role::Publisher, description));

    // Subscribers whose requests were dropped must not consume the ack
    evict_disconnected(inner, session.session_id());

    if inner.pending.is_empty() {
        let (tx, rx) = oneshot::channel();
        inner.publisher_waiter = Some(tx);
        inner.state = SessionState::AwaitingPeer;

        debug!(
            session = session.session_id(),
            peer = peer_id,
            "publisher offer stored, awaiting subscribers"
        );
        return Ok(Outcome::Pending(rx));
    }

    // Drain the queue FIFO: every parked subscriber receives the
    // publisher's description; the first one's becomes the
    // publisher's answer.
    let mut ack = None;
    let mut drained = 0usize;

    while let Some(pending) = inner.pending.pop_front() {
        if ack.is_none() {
            ack = Some(pending.description.clone());
        }

        inner
            .answered
            .insert(pending.peer_id.clone(), publisher_sd.clone());
        let _ = pending.reply.send(Ok(publisher_sd.clone()));
        drained += 1;
    }

    inner.state = SessionState::Paired;
    info!(
        session = session.session_id(),
        subscribers = drained,
        "publisher paired with queued subscribers"
    );

    ack.map(Outcome::Answer).ok_or_else(|| {
        Error::Internal(format!(
            "session {}: drained an empty subscriber queue",
            session.session_id()
        ))
    })
}

fn submit_subscriber(
    session: &Session,
    inner: &mut SessionInner,
    peer_id: &str,
    description: SessionDescription,
) -> Result<Outcome> {
    // Idempotent resubmission: the same peer gets the same answer
    if let Some(answer) = inner.answered.get(peer_id) {
        debug!(
            session = session.session_id(),
            peer = peer_id,
            "resubmission, returning the delivered answer"
        );
        return Ok(Outcome::Answer(answer.clone()));
    }

    if let Some(publisher) = &inner.publisher {
        let answer = publisher.description.clone();
        inner.answered.insert(peer_id.to_string(), answer.clone());
        inner.state = SessionState::Paired;

        // Acknowledge the publisher's held request, if still open
        if let Some(waiter) = inner.publisher_waiter.take() {
            let _ = waiter.send(Ok(description));
        }

        debug!(
            session = session.session_id(),
            peer = peer_id,
            "subscriber paired with stored publisher offer"
        );
        return Ok(Outcome::Answer(answer));
    }

    // No publisher yet: park FIFO. A resubmission replaces the previous
    // entry in place so the peer keeps its position in the queue.
    let (tx, rx) = oneshot::channel();
    let entry = PendingSubscriber {
        peer_id: peer_id.to_string(),
        description,
        reply: tx,
    };

    if let Some(existing) = inner.pending.iter_mut().find(|p| p.peer_id == peer_id) {
        *existing = entry;
    } else {
        inner.pending.push_back(entry);
    }

    inner.state = SessionState::AwaitingPeer;
    debug!(
        session = session.session_id(),
        peer = peer_id,
        queued = inner.pending.len(),
        "subscriber parked, no publisher offer yet"
    );

    Ok(Outcome::Pending(rx))
}
