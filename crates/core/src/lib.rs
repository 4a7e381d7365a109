//! Negotiation core for SignalHub
//!
//! SignalHub mediates WebRTC offer/answer exchange between one
//! publisher and N subscribers per session. This crate holds the
//! transport-independent core; the HTTP surface lives in
//! `signalhub-http`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Transport (HTTP POST /sdp)                          │
//! │  ↓                                                    │
//! │  Coordinator (timeouts, close signals, idle sweeper) │
//! │  ├─ SessionRegistry (id → Session, own lock)         │
//! │  └─ exchange::submit (pairing rules, FIFO queue)     │
//! │      └─ Session (per-session lock, parked waiters)   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Each signaling request runs on its own task. A request whose
//! counterpart has not arrived is parked on a oneshot channel and
//! resolved by the counterpart, the pairing timeout, or an explicit
//! close; no request is ever left hanging.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod exchange;
pub mod message;
pub mod session;

pub use config::SignalingConfig;
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use message::{
    subscriber_peer_id, Role, SdpOffer, SessionDescription, PUBLISHER_NAME, SUBSCRIBER_PREFIX,
};
pub use session::{Session, SessionId, SessionRegistry, SessionState};

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
