//! Logging setup
//!
//! Installs a `tracing` subscriber. The terminal UI owns the screen, so it
//! logs to `mango.log` next to the executable; one-shot commands log to
//! stderr. `RUST_LOG` overrides the configured level.

use crate::error::{MangoError, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Log file path (same directory as executable)
pub fn default_log_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mango.log")
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global subscriber. A second call is a no-op.
pub fn init(target: LogTarget, level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(false);

    let installed = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Start fresh each run
                .open(&path)
                .map_err(|e| MangoError::Logging(format!("{}: {}", path.display(), e)))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    // Already installed (tests, repeated init) is fine
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_sits_next_to_the_executable() {
        let path = default_log_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("mango.log"));
    }

    #[test]
    fn repeated_init_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mango.log");
        init(LogTarget::File(path.clone()), "debug").unwrap();
        init(LogTarget::Stderr, "warn").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("mango.log");
        let err = init(LogTarget::File(path), "info").unwrap_err();
        assert!(matches!(err, MangoError::Logging(_)));
    }
}
