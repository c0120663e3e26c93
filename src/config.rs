//! Environment-driven runtime configuration.

use std::time::Duration;

const DEFAULT_HTTP_PORT: u16 = 7879;
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Postgres connection string. Unset means the in-memory store.
    pub db_url: Option<String>,
    /// Upper bound on any single storage call.
    pub storage_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let http_port = std::env::var("AUTHD_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);
        let db_url = std::env::var("AUTHD_DB_URL").ok().filter(|s| !s.is_empty());
        let timeout_ms = std::env::var("AUTHD_STORAGE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_STORAGE_TIMEOUT_MS);
        Self { http_port, db_url, storage_timeout: Duration::from_millis(timeout_ms) }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            db_url: None,
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
        }
    }
}
