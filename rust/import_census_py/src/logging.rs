//! Global `tracing` subscriber for the command line.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a stderr fmt subscriber once. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    if LOGGING_INITIALIZED.get().is_some() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        tracing::debug!(error = %error, "Tracing subscriber already initialized");
    }
    let _ = LOGGING_INITIALIZED.set(());
}
