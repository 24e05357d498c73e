//! Logging initialization with tracing

use anyhow::Result;

/// Initialize tracing subscriber for logging
///
/// Configures the tracing subscriber with:
/// - Environment filter (defaults to INFO level, `RUST_LOG` overrides)
/// - Stderr output, so `--json` stdout stays machine-readable
///
/// # Errors
/// Returns an error if the subscriber initialization fails
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
