//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading with validation: required variables must be present
//! and valid, or the application exits with a clear error message.

use std::env;
use std::time::Duration;

use finlink_provider::RetryConfig;
use finlink_sync::WorkerConfig;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Provider API credentials and environment.
    pub provider_base_url: String,
    pub provider_client_id: String,
    pub provider_secret: String,
    /// Publicly reachable URL registered with the provider for webhooks.
    pub webhook_url: String,
    /// Absolute base URL pagination links are built from.
    pub site_url: String,
    /// Bind address.
    pub host: String,
    pub port: u16,
    /// Log filter directive.
    pub rust_log: String,
    /// Worker pool sizing.
    pub worker: WorkerConfig,
    /// Retry policy for provider calls.
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require("DATABASE_URL")?;
        let provider_base_url = require("PROVIDER_BASE_URL")?;
        let provider_client_id = require("PROVIDER_CLIENT_ID")?;
        let provider_secret = require("PROVIDER_SECRET")?;
        let webhook_url = require("WEBHOOK_URL")?;
        let site_url = require("SITE_URL")?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_or("PORT", 8080u16)?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let worker = WorkerConfig {
            concurrency: parse_or("WORKER_CONCURRENCY", WorkerConfig::default().concurrency)?,
        };

        let defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_retries: parse_or("SYNC_MAX_RETRIES", defaults.max_retries)?,
            initial_delay: Duration::from_millis(parse_or(
                "SYNC_INITIAL_DELAY_MS",
                defaults.initial_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_or(
                "SYNC_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )?),
            backoff_multiplier: defaults.backoff_multiplier,
            jitter: defaults.jitter,
        };

        Ok(Self {
            database_url,
            provider_base_url,
            provider_client_id,
            provider_secret,
            webhook_url,
            site_url,
            host,
            port,
            rust_log,
            worker,
            retry,
        })
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require(var: &str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var.to_string())),
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(v) => v.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("could not parse {v:?}"),
        }),
    }
}
