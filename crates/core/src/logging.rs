//! Log file setup.
//!
//! Terminal output belongs to the spinner and the GUI, so diagnostics go to a
//! daily log file under `<data_local_dir>/scenelens/logs/`. The level is read
//! from `SCENELENS_LOG`:
//!
//! ```bash
//! SCENELENS_LOG=debug scenelens clip.mp4 schema.json
//! ```

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{Error, Result};

pub const LOG_ENV: &str = "SCENELENS_LOG";
const DEFAULT_FILTER: &str = "scenelens=info,scenelens_core=info,scenelens_desktop=info,warn";

pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir).map_err(|source| Error::Io {
        path: log_dir.clone(),
        source,
    })?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "scenelens.log");

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| Error::Config {
            message: format!("logging already initialized: {e}"),
        })?;

    tracing::info!(log_dir = %log_dir.display(), "scenelens starting");
    Ok(log_dir)
}

pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scenelens")
        .join("logs")
}
