//! Configuration loader for the `greenwatch` monitoring service.
//!
//! Centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Consolidating configuration here keeps
//! `env::var` calls out of the rest of the codebase.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Supabase project base URL (without the `/rest/v1` suffix).
    pub supabase_url: String,

    /// Supabase anon/service API key sent with every request.
    pub supabase_api_key: String,

    /// Seconds between monitor polling ticks.
    pub poll_interval_secs: u64,

    /// Port the HTTP API binds to.
    pub http_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `SUPABASE_URL` – Supabase project base URL
/// - `SUPABASE_API_KEY` – API key for the PostgREST endpoints
///
/// Optional:
/// - `POLL_INTERVAL_SECS` – monitor tick period (default: 120)
/// - `HTTP_PORT` – API listen port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let supabase_url = require_env!("SUPABASE_URL");
    let supabase_api_key = require_env!("SUPABASE_API_KEY");
    let poll_interval_secs = parse_env!("POLL_INTERVAL_SECS", u64, 120);
    let http_port = parse_env!("HTTP_PORT", u16, 8080);

    Ok(Config {
        supabase_url,
        supabase_api_key,
        poll_interval_secs,
        http_port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Shows everything except the API key, which is reduced to a short
    /// prefix so deployments can still be told apart.
    pub fn log_config(&self) {
        // ---
        let masked_key = if self.supabase_api_key.len() > 8 {
            format!("{}****", &self.supabase_api_key[..8])
        } else {
            "****".to_string()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  SUPABASE_URL       : {}", self.supabase_url);
        tracing::info!("  SUPABASE_API_KEY   : {}", masked_key);
        tracing::info!("  POLL_INTERVAL_SECS : {}", self.poll_interval_secs);
        tracing::info!("  HTTP_PORT          : {}", self.http_port);
    }
}
