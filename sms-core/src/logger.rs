//! Tracing setup: console and log file share one fmt layer (level, target, span close events, fields).

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Opens `log_file_path` for appending, creating its parent directory first.
///
/// A service started on a fresh machine typically points `LOG_FILE` at a directory that does not
/// exist yet (`logs/sms-backup.log`); opening the file alone would fail there and abort startup
/// before anything could be logged.
fn open_log_file(log_file_path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
}

/// Installs the global tracing subscriber, writing every event to stdout and to `log_file_path`.
///
/// The level comes from `RUST_LOG` (e.g. `info`, `sms_backup=debug`), defaulting to `info`.
/// Load `.env` (`dotenvy::dotenv()`) before calling this, otherwise `RUST_LOG` from the file is ignored.
/// Missing log directories are created (see [`open_log_file`]).
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = Arc::new(open_log_file(log_file_path)?);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
