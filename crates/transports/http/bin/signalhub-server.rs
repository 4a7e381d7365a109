//! SignalHub server binary entry point
//!
//! Starts the HTTP SDP exchange server for WebRTC publisher/subscriber
//! signaling.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (127.0.0.1:8080, 30s pairing timeout)
//! cargo run --bin signalhub-server
//!
//! # Bind elsewhere
//! SIGNALHUB_BIND_ADDR="0.0.0.0:9000" cargo run --bin signalhub-server
//!
//! # Shorter pairing timeout
//! SIGNALHUB_PAIRING_TIMEOUT_MS=10000 cargo run --bin signalhub-server
//! ```
//!
//! # Environment Variables
//!
//! - `SIGNALHUB_BIND_ADDR`: Bind address (default: `127.0.0.1:8080`)
//! - `SIGNALHUB_PAIRING_TIMEOUT_MS`: How long a held offer waits for its counterpart (default: `30000`)
//! - `SIGNALHUB_SWEEP_INTERVAL_MS`: Idle sweeper interval (default: `1000`)
//! - `SIGNALHUB_MAX_SESSIONS`: Maximum concurrent sessions, 0 = unlimited (default: `0`)
//! - `RUST_LOG`: Logging level (default: `info`, options: `trace`, `debug`, `info`, `warn`, `error`)

use anyhow::Context;
use signalhub_core::{Coordinator, SignalingConfig};
use signalhub_http::HttpServer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Set up Ctrl+C handler at the very start
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_handler = Arc::clone(&shutdown_flag);

    ctrlc::set_handler(move || {
        eprintln!("\nCtrl+C received, initiating shutdown...");

        let was_already_set = shutdown_flag_handler.swap(true, Ordering::SeqCst);
        if was_already_set {
            eprintln!("shutdown already in progress, forcing immediate exit");
            std::process::exit(0);
        }

        // Watchdog: force exit if graceful shutdown stalls
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(3));
            eprintln!("graceful shutdown timeout (3s), forcing exit");
            std::process::exit(0);
        });
    })
    .context("failed to set Ctrl+C handler")?;

    // Create multi-threaded tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("signalhub-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(shutdown_flag))
}

async fn async_main(shutdown_flag: Arc<AtomicBool>) -> anyhow::Result<()> {
    init_tracing();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "SignalHub server starting"
    );

    let config = load_config_from_env()?;

    info!(
        bind_address = %config.bind_address,
        pairing_timeout_ms = config.pairing_timeout_ms,
        sweep_interval_ms = config.sweep_interval_ms,
        max_sessions = config.max_sessions,
        "configuration loaded"
    );

    let coordinator = Arc::new(Coordinator::new(config.clone()));
    let sweeper = coordinator.spawn_sweeper();

    let server = HttpServer::new(&config, Arc::clone(&coordinator));

    let shutdown = {
        let flag = Arc::clone(&shutdown_flag);
        async move {
            while !flag.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            info!("shutdown signal received, draining connections");
        }
    };

    server.serve_with_shutdown(shutdown).await?;

    sweeper.abort();
    info!("SignalHub server shut down gracefully");

    Ok(())
}

fn init_tracing() {
    // EnvFilter for RUST_LOG support
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config_from_env() -> anyhow::Result<SignalingConfig> {
    let defaults = SignalingConfig::default();

    let bind_address =
        std::env::var("SIGNALHUB_BIND_ADDR").unwrap_or_else(|_| defaults.bind_address.clone());

    let pairing_timeout_ms = env_parse("SIGNALHUB_PAIRING_TIMEOUT_MS")?
        .unwrap_or(defaults.pairing_timeout_ms);

    let sweep_interval_ms =
        env_parse("SIGNALHUB_SWEEP_INTERVAL_MS")?.unwrap_or(defaults.sweep_interval_ms);

    let max_sessions = env_parse("SIGNALHUB_MAX_SESSIONS")?.unwrap_or(defaults.max_sessions);

    let config = SignalingConfig {
        bind_address,
        pairing_timeout_ms,
        sweep_interval_ms,
        max_sessions,
    };

    config.validate().context("invalid configuration")?;

    Ok(config)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => {
            let parsed = value
                .parse::<T>()
                .with_context(|| format!("invalid value for {name}: {value}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}
