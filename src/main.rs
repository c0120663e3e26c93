use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let cfg = authd::config::Config::from_env();

    // Startup banner at info level so something always prints at default
    // verbosity. The connection string is never logged.
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "authd",
        "authd starting: RUST_LOG='{}', http_port={}, db_url_set={}, storage_timeout_ms={}",
        rust_log, cfg.http_port, cfg.db_url.is_some(), cfg.storage_timeout.as_millis()
    );

    authd::server::run_with_config(cfg).await
}
