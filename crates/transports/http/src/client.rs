//! HTTP signaling client
//!
//! The Rust counterpart of the browser glue: posts a local description
//! to `POST /sdp` and resolves the paired remote description from the
//! held response.
//!
//! # Usage
//!
//! ```ignore
//! use signalhub_http::SignalingClient;
//!
//! let client = SignalingClient::new("http://localhost:8080")?;
//! let remote = client.join(None, &local_description).await?;
//! ```

use crate::error::{Error, Result};
use crate::server::{ErrorResponse, SdpRequest, SdpResponse};
use signalhub_core::{subscriber_peer_id, SessionDescription, PUBLISHER_NAME};
use std::time::Duration;

/// How long the client keeps a held `/sdp` request open
///
/// Must exceed the server's pairing timeout so that the server, not the
/// client, decides the outcome of a pending exchange.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for SDP exchange against a SignalHub server
pub struct SignalingClient {
    /// Base URL (e.g. "http://localhost:8080")
    base_url: String,

    /// Reqwest HTTP client
    client: reqwest::Client,
}

impl SignalingClient {
    /// Create a new signaling client with the default request timeout
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server base URL (e.g. "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new signaling client with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();

        if base_url.is_empty() {
            return Err(Error::Connection("base_url cannot be empty".to_string()));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Connection(format!(
                "base_url must start with http:// or https://, got: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// Publish a local description under the reserved publisher name
    ///
    /// Held open until a subscriber pairs; resolves with the first
    /// subscriber's description.
    pub async fn publish(
        &self,
        session: Option<&str>,
        sd: &SessionDescription,
    ) -> Result<SessionDescription> {
        self.submit(PUBLISHER_NAME, session, sd).await
    }

    /// Join a session as a subscriber under a generated peer id
    ///
    /// Returns the generated peer id together with the publisher's
    /// description; resubmitting under the same id returns the same
    /// answer.
    pub async fn join(
        &self,
        session: Option<&str>,
        sd: &SessionDescription,
    ) -> Result<(String, SessionDescription)> {
        let peer_id = subscriber_peer_id();
        let answer = self.submit(&peer_id, session, sd).await?;

        Ok((peer_id, answer))
    }

    /// Submit a local description under an explicit peer name
    pub async fn submit(
        &self,
        name: &str,
        session: Option<&str>,
        sd: &SessionDescription,
    ) -> Result<SessionDescription> {
        let url = format!("{}/sdp", self.base_url);
        let request = SdpRequest {
            name: name.to_string(),
            sd: sd.clone(),
            session: session.map(str::to_string),
        };

        tracing::debug!(peer = name, url = %url, "submitting local description");

        let response = self.client.post(&url).json(&request).send().await?;
        let response = Self::check_status(response).await?;

        let body: SdpResponse = response.json().await?;
        Ok(body.sd)
    }

    /// Send an explicit close signal for a session
    pub async fn close(&self, session_id: &str) -> Result<()> {
        let url = format!("{}/session/{}", self.base_url, session_id);

        let response = self.client.delete(&url).send().await?;
        Self::check_status(response).await?;

        Ok(())
    }

    /// Check that the server is reachable
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;
        Self::check_status(response).await?;

        Ok(())
    }

    /// Turn a non-2xx response into the matching error
    ///
    /// A machine-readable `error_type` body maps back onto the protocol
    /// taxonomy; anything else surfaces as [`Error::Http`].
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
            return Err(Error::Signaling(signalhub_core::Error::from_kind(
                &err.error_type,
                err.message,
            )));
        }

        Err(Error::Http { status, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_bad_base_urls() {
        assert!(SignalingClient::new("").is_err());
        assert!(SignalingClient::new("ws://localhost:8080").is_err());
        assert!(SignalingClient::new("localhost:8080").is_err());
    }

    #[test]
    fn test_client_accepts_http_urls() {
        assert!(SignalingClient::new("http://localhost:8080").is_ok());
        assert!(SignalingClient::new("https://signal.example.com").is_ok());
    }
}
