//! Structured logging using the tracing crate.
//!
//! Writes to daily-rotated files under the XDG state directory so diagnostic
//! detail (raw network errors, device failures) never reaches the display.
//! Log level is controlled by RUST_LOG (default "info").

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Keeps the non-blocking appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes file-based logging.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = log_dir()?;

    let file_appender = rolling::daily(&log_dir, "echoid.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("logging initialized, log dir: {}", log_dir.display());
    Ok(())
}

/// Log directory per the XDG Base Directory Specification:
/// `$XDG_STATE_HOME/echoid`, falling back to `~/.local/state/echoid`.
fn log_dir() -> Result<PathBuf, anyhow::Error> {
    let dir = if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg_state).join("echoid")
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
        home.join(".local/state/echoid")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
