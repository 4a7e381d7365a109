//! HTTP transport for SignalHub
//!
//! Exposes the negotiation core over HTTP: an axum server holding
//! `POST /sdp` requests open until pairing, and a reqwest client that
//! plays the role of the original browser glue.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │  Peers (browser/native)                        │
//! │  ↓ POST /sdp {Name, SD}                        │
//! │  HttpServer (held connections, error mapping)  │
//! │  ↓                                             │
//! │  signalhub-core::Coordinator                   │
//! └────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod server;

pub use client::SignalingClient;
pub use error::{Error, Result};
pub use server::{ErrorResponse, HttpServer, SdpRequest, SdpResponse, DEFAULT_SESSION};

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
