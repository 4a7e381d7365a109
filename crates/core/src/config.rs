//! Configuration types for the signaling server

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the signaling server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalingConfig {
    /// Address the HTTP transport binds to (default: `127.0.0.1:8080`)
    pub bind_address: String,

    /// How long a parked offer waits for its counterpart before the
    /// session times out, in milliseconds (default: 30000)
    pub pairing_timeout_ms: u64,

    /// Interval of the idle sweeper, in milliseconds (default: 1000)
    pub sweep_interval_ms: u64,

    /// Maximum number of concurrent sessions (default: 0 = unlimited)
    pub max_sessions: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            pairing_timeout_ms: 30_000,
            sweep_interval_ms: 1_000,
            max_sessions: 0,
        }
    }
}

impl SignalingConfig {
    /// Pairing timeout as a [`Duration`]
    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_millis(self.pairing_timeout_ms)
    }

    /// Sweep interval as a [`Duration`]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `bind_address` is not a valid socket address
    /// - `pairing_timeout_ms` is zero
    /// - `sweep_interval_ms` is zero or exceeds the pairing timeout
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(Error::InvalidConfig(format!(
                "bind_address must be a socket address, got {}",
                self.bind_address
            )));
        }

        if self.pairing_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "pairing_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.sweep_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "sweep_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.sweep_interval_ms > self.pairing_timeout_ms {
            return Err(Error::InvalidConfig(format!(
                "sweep_interval_ms ({}) must not exceed pairing_timeout_ms ({})",
                self.sweep_interval_ms, self.pairing_timeout_ms
            )));
        }

        Ok(())
    }
}
