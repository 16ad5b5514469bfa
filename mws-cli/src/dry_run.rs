//! Transport that prints requests instead of sending them.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use mws::error::TransportError;
use mws::transport::{Transport, TransportRequest, TransportResponse};

/// Body handed back to the client for every printed request.
pub const DRY_RUN_BODY: &str = "dry run: request not sent";

/// Writes each request as `POST <url>`, the `Content-Type` line, a blank
/// line and the body, then answers with a synthetic `200`.
pub struct DryRunTransport {
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for DryRunTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DryRunTransport").finish_non_exhaustive()
    }
}

impl DryRunTransport {
    /// Prints to stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Prints to `out`.
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut out = self.out.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(
            out,
            "POST {}\nContent-Type: {}\n\n{}",
            request.url,
            request.content_type,
            request.body_text()
        )
        .and_then(|()| out.flush())
        .map_err(TransportError::request)?;

        Ok(TransportResponse {
            status: 200,
            body: DRY_RUN_BODY.to_owned(),
        })
    }
}
