use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::{Error, Result};

/// `link_parser_<YYYYMMDD_HHMMSS>.log`
pub fn log_file_name(at: DateTime<Local>) -> String {
    format!("link_parser_{}.log", at.format("%Y%m%d_%H%M%S"))
}

/// Sends INFO records (or whatever `RUST_LOG` asks for) to a fresh file in `log_dir`
/// and warnings to stderr.
/// Keep the returned guard alive for the whole run, dropping it flushes the file.
pub fn init_run_log(log_dir: &Path) -> Result<(PathBuf, WorkerGuard)> {
    std::fs::create_dir_all(log_dir).map_err(|e| Error::fs(log_dir, e))?;
    let file_name = log_file_name(Local::now());
    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(LevelFilter::WARN),
        )
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok((log_dir.join(file_name), guard))
}
