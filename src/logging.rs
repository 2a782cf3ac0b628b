/// Tracing setup for the crawler binary.
///
/// Two outputs: a compact stdout layer for interactive use and a daily
/// rotating, non-blocking file layer under `<data_dir>/logs/`. Level
/// filtering comes from `RUST_LOG` (default: "info").

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the global subscriber. Call once, from the binary only.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init<P: AsRef<Path>>(data_dir: P) -> Result<(), Box<dyn std::error::Error>> {
    let log_path = data_dir.as_ref().join("logs");
    std::fs::create_dir_all(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let file_appender = tracing_appender::rolling::daily(&log_path, "crawl.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_filter(env_filter);

    let stdout_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(stdout_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    // The guard must outlive the process for the background writer to flush.
    Box::leak(Box::new(file_guard));

    tracing::debug!("logs written to {}", log_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    #[test]
    fn test_log_directory_creation() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs");

        // init() installs a global subscriber and can only run once per
        // process, so only the directory handling is exercised here.
        std::fs::create_dir_all(&log_path).unwrap();
        assert!(log_path.exists());
    }
}
