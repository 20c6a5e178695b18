pub mod config;
pub mod interpretation;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. Honours `RUST_LOG`, else `config::default_log_filter()`.
/// Logs go to stderr so stdout stays clean for JSON output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
