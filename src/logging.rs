use crate::config::app_dir;
use crate::error::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub enum LogTarget {
    Stderr,
    /// The TUI owns the terminal, so logs go to a file instead.
    File(PathBuf),
}

pub fn default_log_file() -> PathBuf {
    app_dir().join("repotally.log")
}

pub fn init(level: &str, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
            let _ = registry.with(layer).try_init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            let _ = registry.with(layer).try_init();
        }
    }
    Ok(())
}
