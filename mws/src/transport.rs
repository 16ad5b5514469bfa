//! The HTTP seam between the client and the network.
//!
//! The core crate never talks HTTP itself. A [`Transport`] receives a fully
//! prepared [`TransportRequest`] and is expected to POST it, attaching the
//! merchant's TLS client identity. `mws-http` provides the `reqwest`-based
//! implementation.

use async_trait::async_trait;

use crate::error::TransportError;

/// A prepared gateway request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute endpoint URL.
    pub url: String,
    /// `Content-Type` header value.
    pub content_type: String,
    /// Encoded (and, for XML operations, signed) body.
    pub body: Vec<u8>,
}

impl TransportRequest {
    /// Body as text, lossily decoded.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// What came back over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Issues a single HTTPS POST per request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// A non-success status is still `Ok`; the client decides what counts
    /// as a failed exchange.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if no response was received.
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
