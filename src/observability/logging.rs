//! Structured logging.
//!
//! # Responsibilities
//! - Build the process subscriber (stderr + optional log file)
//! - Retarget the level and file at runtime when configuration changes
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The reconfigurable part lives in an explicit [`LoggingContext`] that
//!   the orchestrator owns, instead of being rebuilt through global state
//! - Log level configurable via config; `RUST_LOG` seeds the initial filter

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// The level and file most recently applied to a [`LoggingContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub level: LevelFilter,
    pub path: Option<PathBuf>,
}

type SharedFile = Arc<Mutex<Option<File>>>;

/// `MakeWriter` that writes to whichever file is currently configured,
/// or discards output when none is.
#[derive(Clone, Default)]
pub struct FileSink {
    file: SharedFile,
}

pub struct FileSinkWriter {
    file: SharedFile,
}

impl Write for FileSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock().unwrap_or_else(PoisonError::into_inner).as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock().unwrap_or_else(PoisonError::into_inner).as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileSinkWriter {
            file: self.file.clone(),
        }
    }
}

/// Reconfigurable diagnostic sink.
pub struct LoggingContext {
    filter: reload::Handle<EnvFilter, Registry>,
    sink: FileSink,
    target: Mutex<Option<LogTarget>>,
}

impl LoggingContext {
    /// Create a context and the subscriber it controls.
    ///
    /// The caller decides what to do with the subscriber: install it
    /// globally (`SubscriberInitExt::init`), scope it to a test with
    /// `tracing::subscriber::with_default`, or drop it.
    pub fn new() -> (Self, impl Subscriber + Send + Sync + 'static) {
        let initial = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let (filter_layer, filter) = reload::Layer::new(initial);
        let sink = FileSink::default();

        let subscriber = Registry::default()
            .with(filter_layer)
            .with(fmt::layer().with_writer(io::stderr))
            .with(fmt::layer().with_ansi(false).with_writer(sink.clone()));

        let context = Self {
            filter,
            sink,
            target: Mutex::new(None),
        };
        (context, subscriber)
    }

    /// A context whose subscriber is discarded. Retargeting still opens
    /// files and records the target, but no events reach it.
    pub fn detached() -> Self {
        Self::new().0
    }

    /// Point the filter and the log file at `config`.
    ///
    /// Creates the file's parent directories. Unknown level names fall
    /// back to INFO.
    pub fn apply(&self, config: &LoggingConfig) -> io::Result<()> {
        let level = parse_level(&config.level).unwrap_or_else(|| {
            tracing::warn!(level = %config.level, "Unknown log level, using INFO");
            LevelFilter::INFO
        });

        let file = match &config.path {
            Some(path) => Some(open_log_file(path)?),
            None => None,
        };

        if let Err(e) = self
            .filter
            .reload(EnvFilter::default().add_directive(level.into()))
        {
            tracing::debug!(error = %e, "Log filter not attached to a live subscriber");
        }
        *self.sink.file.lock().unwrap_or_else(PoisonError::into_inner) = file;

        let target = LogTarget {
            level,
            path: config.path.clone(),
        };
        tracing::info!(
            level = %target.level,
            path = ?target.path,
            "Logging target configured"
        );
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(target);
        Ok(())
    }

    /// The most recently applied target, if any.
    pub fn target(&self) -> Option<LogTarget> {
        self.target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Accepts tracing level names plus the `WARNING`/`CRITICAL` spellings.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(LevelFilter::WARN),
        "critical" | "fatal" => Some(LevelFilter::ERROR),
        "notset" => Some(LevelFilter::TRACE),
        other => other.parse().ok(),
    }
}
