//! Wire-visible signaling types: descriptions, roles and peer ids

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Reserved peer name for the publishing side of a session
pub const PUBLISHER_NAME: &str = "Publisher";

/// Prefix of generated subscriber peer ids
pub const SUBSCRIBER_PREFIX: &str = "Client";

/// A serialized `RTCSessionDescription` as posted by browser peers
///
/// The payload is opaque to the server: it is stored and returned
/// verbatim, never inspected beyond the shape check in
/// [`SessionDescription::validate`]. Only full, pre-gathered
/// descriptions are exchanged; there is no trickle support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// Description type ("offer" or "answer")
    #[serde(rename = "type")]
    pub kind: String,

    /// Raw SDP text
    pub sdp: String,
}

impl SessionDescription {
    /// Create a description from its type and SDP text
    pub fn new(kind: impl Into<String>, sdp: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            sdp: sdp.into(),
        }
    }

    /// Reject descriptions that cannot possibly be negotiated
    pub fn validate(&self) -> Result<()> {
        if self.kind.is_empty() {
            return Err(Error::Malformed(
                "session description is missing its type".to_string(),
            ));
        }

        if self.sdp.is_empty() {
            return Err(Error::Malformed(
                "session description carries an empty SDP payload".to_string(),
            ));
        }

        Ok(())
    }
}

/// Role of a peer in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends media; at most one per session
    Publisher,
    /// Receives media; unbounded per session
    Subscriber,
}

impl Role {
    /// Derive the role from a peer name
    ///
    /// The publishing side uses the reserved name `Publisher`;
    /// subscribers send ids of the form `Client:<unixMillis>:<random>`.
    /// Everything else is rejected as malformed.
    pub fn from_peer_name(name: &str) -> Result<Role> {
        let prefix = name.split(':').next().unwrap_or_default();

        if prefix == PUBLISHER_NAME {
            Ok(Role::Publisher)
        } else if prefix == SUBSCRIBER_PREFIX {
            Ok(Role::Subscriber)
        } else {
            Err(Error::Malformed(format!("unrecognized peer name: {name}")))
        }
    }
}

/// A stored offer, immutable once recorded
#[derive(Debug, Clone)]
pub struct SdpOffer {
    /// Originating peer id
    pub peer_id: String,

    /// Role the peer submitted under
    pub role: Role,

    /// The peer's local description
    pub description: SessionDescription,

    /// When the offer arrived
    pub arrived_at: Instant,
}

impl SdpOffer {
    /// Record an offer from a peer
    pub fn new(peer_id: impl Into<String>, role: Role, description: SessionDescription) -> Self {
        Self {
            peer_id: peer_id.into(),
            role,
            description,
            arrived_at: Instant::now(),
        }
    }
}

/// Generate a subscriber peer id of the documented form
/// `Client:<unixMillis>:<random9digits>`
pub fn subscriber_peer_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);

    format!("{SUBSCRIBER_PREFIX}:{millis}:{suffix}")
}
