//! Error types for MWS operations.
//!
//! Every gateway call returns [`MwsError`], which groups the three failure
//! kinds a call can end with:
//!
//! - [`ConfigurationError`] — the client cannot build a valid request
//! - [`SigningError`] — the signing step did not produce an envelope
//! - [`TransportError`] — the HTTP exchange failed or returned nothing usable
//!
//! Configuration and signing errors are raised before any HTTP call is made.

use std::path::PathBuf;
use std::time::Duration;

/// Base error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum MwsError {
    /// The client configuration cannot serve the request.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The request body could not be signed.
    #[error("{0}")]
    Signing(#[from] SigningError),

    /// The HTTP exchange failed.
    #[error("{0}")]
    Transport(#[from] TransportError),
}

/// Invalid or incomplete client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A signing credential required by an XML operation is absent.
    #[error("missing {0} required to sign requests")]
    MissingCredential(&'static str),

    /// The host override is not an absolute URL.
    #[error("invalid gateway host {host:?}: {source}")]
    InvalidHost {
        /// The rejected value.
        host: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The client was built without a transport.
    #[error("no transport configured")]
    MissingTransport,

    /// A timeout is configured as zero, so every call would fail at once.
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Failure of the signing subprocess.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The signing tool could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Piping data to or from the signing tool failed.
    #[error("I/O error while talking to the signing tool: {0}")]
    Io(#[source] std::io::Error),

    /// The signing tool exited unsuccessfully.
    #[error("OpenSSL call failed: {}\n{output}", exit_label(.status))]
    Failed {
        /// Exit code, `None` when the process was killed by a signal.
        status: Option<i32>,
        /// Combined stdout/stderr of the tool.
        output: String,
    },

    /// The signing tool did not finish in time and was killed.
    #[error("signing tool timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of the HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The gateway answered with a non-success status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The gateway answered successfully but with an empty body.
    #[error("empty response body (HTTP {status})")]
    EmptyBody {
        /// HTTP status code.
        status: u16,
    },
}

/// The log file could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum LogFileError {
    /// The path does not name a file.
    #[error("log file path {} has no file name", .0.display())]
    InvalidPath(PathBuf),

    /// The file or its directory could not be created or opened.
    #[error("cannot open log file {}: {source}", path.display())]
    Open {
        /// The requested log file.
        path: PathBuf,
        /// The underlying appender error.
        #[source]
        source: tracing_appender::rolling::InitError,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    status.map_or_else(|| "signal".to_owned(), |code| code.to_string())
}

impl TransportError {
    /// Wraps any error raised by a transport implementation.
    pub fn request(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Request(err.into())
    }
}
