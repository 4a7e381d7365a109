//! HTTP signaling server
//!
//! Provides the SDP exchange endpoints:
//! - POST /sdp - submit a local description, receive the paired remote description
//! - DELETE /session/:session_id - explicit close signal
//! - GET /health - health check
//!
//! A POST whose counterpart has not arrived is held open until pairing,
//! the pairing timeout or a close signal resolves it; the connection is
//! never left hanging past the configured timeout.

use crate::error::{Error, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use signalhub_core::{Coordinator, Role, SessionDescription, SignalingConfig};
use std::sync::Arc;

/// Session id used when the caller does not name one
///
/// The original browser client posts only `Name` and `SD`; those
/// requests all negotiate in this session.
pub const DEFAULT_SESSION: &str = "default";

/// Exact content type the browser client string-matches on
const CONTENT_TYPE_JSON_UTF8: &str = "application/json; charset=utf-8";

/// Server state shared across handlers
#[derive(Clone)]
struct ServerState {
    /// Negotiation coordinator
    coordinator: Arc<Coordinator>,
}

/// Request body for POST /sdp
#[derive(Debug, Serialize, Deserialize)]
pub struct SdpRequest {
    /// Peer name: `Publisher` or `Client:<unixMillis>:<random>`
    #[serde(rename = "Name")]
    pub name: String,

    /// The peer's local session description
    #[serde(rename = "SD")]
    pub sd: SessionDescription,

    /// Session to negotiate in (defaults to [`DEFAULT_SESSION`])
    #[serde(rename = "Session", default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Response body for POST /sdp
#[derive(Debug, Serialize, Deserialize)]
pub struct SdpResponse {
    /// The paired remote description
    #[serde(rename = "SD")]
    pub sd: SessionDescription,
}

/// Structured error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind (e.g. "conflict", "gone", "timeout")
    pub error_type: String,

    /// Human-readable error message
    pub message: String,
}

/// Map a signaling error to an HTTP status and structured body
fn map_error(e: signalhub_core::Error) -> (StatusCode, Json<ErrorResponse>) {
    use signalhub_core::Error as Core;

    let status = match &e {
        Core::NotFound(_) => StatusCode::NOT_FOUND,
        Core::Conflict(_) => StatusCode::CONFLICT,
        Core::Gone(_) => StatusCode::GONE,
        Core::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        Core::Malformed(_) => StatusCode::BAD_REQUEST,
        Core::Capacity(_) => StatusCode::SERVICE_UNAVAILABLE,
        Core::InvalidConfig(_) | Core::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error_type: e.kind().to_string(),
            message: e.to_string(),
        }),
    )
}

/// HTTP signaling server
pub struct HttpServer {
    /// Server bind address
    bind_address: String,
    /// Shared server state
    state: ServerState,
}

impl HttpServer {
    /// Create a new HTTP server
    ///
    /// # Arguments
    ///
    /// * `config` - Validated signaling configuration (bind address)
    /// * `coordinator` - Negotiation coordinator shared with the sweeper
    pub fn new(config: &SignalingConfig, coordinator: Arc<Coordinator>) -> Self {
        Self {
            bind_address: config.bind_address.clone(),
            state: ServerState { coordinator },
        }
    }

    /// Build the router with all endpoints
    pub fn router(coordinator: Arc<Coordinator>) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/sdp", post(sdp_handler))
            .route("/session/:session_id", delete(close_session_handler))
            .with_state(ServerState { coordinator })
            .layer(
                tower::ServiceBuilder::new()
                    .layer(tower_http::trace::TraceLayer::new_for_http())
                    .layer(tower_http::cors::CorsLayer::permissive()),
            )
    }

    /// Start the HTTP server
    ///
    /// This method blocks until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending::<()>()).await
    }

    /// Start the HTTP server, stopping when `shutdown` resolves
    pub async fn serve_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr: std::net::SocketAddr = self
            .bind_address
            .parse()
            .map_err(|e| Error::Server(format!("invalid bind address: {e}")))?;

        tracing::info!("starting HTTP signaling server on {}", addr);

        let router = Self::router(self.state.coordinator.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("failed to bind: {e}")))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::Server(format!("server error: {e}")))?;

        Ok(())
    }
}

// Handler implementations

/// Health check endpoint
async fn health_handler() -> StatusCode {
    StatusCode::OK
}

/// POST /sdp - submit a local description
///
/// Held open while pending; resolves with the paired remote description
/// in `{"SD": ...}` or a structured error.
async fn sdp_handler(
    State(state): State<ServerState>,
    body: Bytes,
) -> std::result::Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // Browser peers post the JSON body under text/plain; the payload is
    // decoded regardless of the request content type
    let request: SdpRequest = serde_json::from_slice(&body).map_err(|e| {
        map_error(signalhub_core::Error::Malformed(format!(
            "invalid request payload: {e}"
        )))
    })?;

    let role = Role::from_peer_name(&request.name).map_err(map_error)?;
    let session_id = request.session.as_deref().unwrap_or(DEFAULT_SESSION);

    let sd = state
        .coordinator
        .submit(session_id, &request.name, role, request.sd)
        .await
        .map_err(map_error)?;

    tracing::debug!(session = session_id, peer = %request.name, "sdp exchange resolved");

    // The original browser client string-matches this exact value
    Ok((
        [(header::CONTENT_TYPE, CONTENT_TYPE_JSON_UTF8)],
        Json(SdpResponse { sd }),
    )
        .into_response())
}

/// DELETE /session/:session_id - explicit close signal
async fn close_session_handler(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
) -> std::result::Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .coordinator
        .close_session(&session_id)
        .await
        .map_err(map_error)?;

    tracing::info!(session = %session_id, "session closed by request");

    Ok(StatusCode::OK)
}
