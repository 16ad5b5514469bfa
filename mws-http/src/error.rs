//! Error types for the HTTP transport.

use std::path::PathBuf;

use mws::{ConfigurationError, SigningError};

/// Errors raised while loading the TLS client identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// A certificate or key file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The key is encrypted and no passphrase was configured.
    #[error("private key {} is encrypted but no passphrase is configured", .0.display())]
    MissingPassphrase(PathBuf),

    /// `openssl` could not decrypt the key.
    #[error("failed to decrypt private key: {0}")]
    Decrypt(#[from] SigningError),

    /// The TLS stack rejected the certificate/key pair.
    #[error("invalid client identity: {0}")]
    Tls(#[source] reqwest::Error),
}

/// Errors raised while building an [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    /// The gateway configuration cannot produce a usable client.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The client identity could not be loaded.
    #[error("{0}")]
    Identity(#[from] IdentityError),

    /// The `reqwest` client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
