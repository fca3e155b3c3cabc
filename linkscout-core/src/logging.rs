//! Logging setup.
//!
//! Every crawl event goes through `tracing`. The subscriber installed here
//! echoes events to the console and appends them to a plain-text log file,
//! one `timestamp - LEVEL - message` line per event. The file is opened in
//! append mode and never rotated, so successive runs accumulate in it.

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{Event, Subscriber, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self as tracing_fmt, FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub const DEFAULT_LOG_FILE: &str = "scraping_log.txt";

/// Timestamp layout used in the log file
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Log file to append to; `None` disables file logging
    pub log_file: Option<PathBuf>,
    /// Echo events to the console
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            console: true,
        }
    }
}

/// `2026-01-01 12:00:00,000 - INFO - message`
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub type FileLayer<S> = tracing_fmt::Layer<S, format::DefaultFields, LineFormat, NonBlocking>;

/// Build a layer appending formatted events to `path`.
///
/// The returned guard flushes pending lines when dropped and must be kept
/// alive for as long as events should reach the file.
pub fn file_layer<S>(path: &Path) -> Result<(FileLayer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log path {} has no file name", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(&directory)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(writer);

    Ok((layer, guard))
}

/// Install the global subscriber.
///
/// A log file that cannot be opened downgrades to console-only logging
/// instead of failing. Only a second initialization is an error.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},hyper=warn,hyper_util=warn,reqwest=warn,html5ever=warn,selectors=warn",
            config.level
        ))
    });

    let console_layer = config.console.then(|| {
        tracing_fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
    });

    let mut file_error = None;
    let (file, guard) = match config.log_file.as_deref().map(file_layer) {
        Some(Ok((layer, guard))) => (Some(layer), Some(guard)),
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(e) = file_error {
        warn!("{:#}; logging to console only", e);
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    fn log_lines(path: &Path, message: &str) {
        let (layer, guard) = file_layer(path).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            info!("{}", message);
        });
        drop(guard);
    }

    #[test]
    fn test_file_layer_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.log");

        log_lines(&path, "Visiting https://x.test/");

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content.lines().next().unwrap();
        assert!(line.ends_with(" - INFO - Visiting https://x.test/"), "{}", line);

        // 2026-01-01 12:00:00,000
        let timestamp = line.split(" - ").next().unwrap();
        assert_eq!(timestamp.len(), 23);
        assert_eq!(&timestamp[19..20], ",");
    }

    #[test]
    fn test_file_layer_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.log");

        log_lines(&path, "first run");
        log_lines(&path, "second run");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("first run"));
        assert!(content.contains("second run"));
    }

    #[test]
    fn test_file_layer_rejects_path_without_file_name() {
        let result = file_layer::<tracing_subscriber::Registry>(Path::new("/"));
        assert!(result.is_err());
    }
}
