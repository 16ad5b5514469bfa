//! Diagnostic log sinks.
//!
//! The client and the signer write free-form diagnostic lines (operation
//! start, request bodies, signing command lines, raw gateway responses) to
//! an injected [`Logger`]. Logging is best-effort: a sink that cannot write
//! must not fail the operation that is logging, and must not block it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::error::LogFileError;

/// Sink for diagnostic messages.
pub trait Logger: Send + Sync {
    /// Records one message.
    fn info(&self, message: &str);
}

impl<T: Logger + ?Sized> Logger for Arc<T> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }
}

/// Emits every message as a `tracing` event on the `mws` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "mws", "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str) {}
}

/// Appends `[YYYY-MM-DD HH:MM:SS] message` lines to a file.
///
/// Lines are handed to a `tracing-appender` background worker, so logging
/// never waits on the disk. Dropping the logger flushes what is queued.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    writer: NonBlocking,
    _guard: WorkerGuard,
}

impl FileLogger {
    /// Default log file name.
    pub const DEFAULT_FILE: &'static str = "yandex.log";

    /// Opens `path` for appending, creating the file and its directory.
    ///
    /// # Errors
    ///
    /// Returns [`LogFileError`] if `path` has no file name or the file
    /// cannot be opened.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, LogFileError> {
        let path = path.into();
        let file_name = path
            .file_name()
            .ok_or_else(|| LogFileError::InvalidPath(path.clone()))?;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name.to_string_lossy())
            .build(dir)
            .map_err(|source| LogFileError::Open {
                path: path.clone(),
                source,
            })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        Ok(Self {
            path,
            writer,
            _guard: guard,
        })
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Logger for FileLogger {
    fn info(&self, message: &str) {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{stamp}] {message}\n");
        if let Err(err) = self.writer.clone().write_all(line.as_bytes()) {
            tracing::warn!(path = %self.path.display(), error = %err, "Failed to queue MWS log line");
        }
    }
}
