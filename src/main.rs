//! Application entry point for the `greenwatch` monitoring service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the Supabase/PostgREST client
//! - Spawning the background monitor (poll → evaluate → alert)
//! - Mounting all API routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `SUPABASE_URL` (**required**) – Supabase project base URL
//! - `SUPABASE_API_KEY` (**required**) – PostgREST API key
//! - `POLL_INTERVAL_SECS` (optional) – monitor tick period (default: 120)
//! - `HTTP_PORT` (optional) – API listen port (default: 8080)
//! - `GREENWATCH_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `GREENWATCH_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! Shutdown is cooperative: Ctrl-C stops the HTTP server gracefully, then
//! the monitor task is signalled and awaited so an in-flight fetch can
//! finish before the process exits.

use std::{env, io::IsTerminal, net::SocketAddr, time::Duration};

use anyhow::Result;
use dotenvy::dotenv;
use tokio::sync::watch;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

mod config;
mod daylight;
mod evaluate;
mod models;
mod monitor;
mod routes;
mod supabase;

pub use config::Config;

// These are not used here but they are re-exported for routes/*.rs, that way
// refactoring is easier since routes/*.rs only need knowledge of their parent
// module, not of models.rs directly.
pub use models::{HistoryEntry, VegetationProfile};

use monitor::{ActiveProfile, LogNotifier, Monitor, StatusBoard};
use supabase::SupabaseClient;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let supabase = SupabaseClient::new(&cfg.supabase_url, &cfg.supabase_api_key);
    let active = ActiveProfile::default();
    let status = StatusBoard::default();

    // Background poller; a watch channel signals it to stop on shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = Monitor::new(
        supabase.clone(),
        LogNotifier,
        active.clone(),
        status.clone(),
    );
    let period = Duration::from_secs(cfg.poll_interval_secs);
    let monitor_task = tokio::spawn(monitor.run(period, shutdown_rx));

    // Build app from routes gateway
    let app = routes::router(supabase, active, status);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the poller and wait for any in-flight tick to finish
    let _ = shutdown_tx.send(true);
    monitor_task.await?;

    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// Configures [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by `GREENWATCH_SPAN_EVENTS`:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `GREENWATCH_LOG_LEVEL` env var
///
/// Call once at startup before any logging or tracing macros are invoked;
/// installs the subscriber globally for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("GREENWATCH_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to GREENWATCH_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("GREENWATCH_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
