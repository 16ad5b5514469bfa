//! Test doubles for the client's injected capabilities.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{SigningError, TransportError};
use crate::log::Logger;
use crate::signer::{SignedEnvelope, Signer, SigningCredentials};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Keeps every message in memory. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_owned());
    }
}

/// Wraps the body in fake PEM armour, or fails on demand.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSigner {
    fail: bool,
    signed: Arc<Mutex<Vec<(Vec<u8>, SigningCredentials)>>>,
}

impl FakeSigner {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Bodies (and credentials) the signer was asked to sign.
    pub(crate) fn signed(&self) -> Vec<(Vec<u8>, SigningCredentials)> {
        self.signed.lock().unwrap().clone()
    }

    pub(crate) fn armour(body: &[u8]) -> Vec<u8> {
        let mut out = b"-----BEGIN PKCS7-----\n".to_vec();
        out.extend_from_slice(body);
        out.extend_from_slice(b"\n-----END PKCS7-----\n");
        out
    }
}

#[async_trait]
impl Signer for FakeSigner {
    async fn sign(
        &self,
        body: &[u8],
        credentials: &SigningCredentials,
        log: &dyn Logger,
    ) -> Result<SignedEnvelope, SigningError> {
        self.signed
            .lock()
            .unwrap()
            .push((body.to_vec(), credentials.clone()));
        log.info("fake signer invoked");
        if self.fail {
            return Err(SigningError::Failed {
                status: Some(1),
                output: "bad decrypt".to_owned(),
            });
        }
        Ok(SignedEnvelope::new(Self::armour(body)))
    }
}

/// Records requests and answers with a canned response.
#[derive(Debug, Clone)]
pub(crate) struct RecordingTransport {
    response: Result<TransportResponse, String>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl RecordingTransport {
    pub(crate) fn responding(status: u16, body: &str) -> Self {
        Self {
            response: Ok(TransportResponse {
                status,
                body: body.to_owned(),
            }),
            requests: Arc::default(),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_owned()),
            requests: Arc::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.response.clone().map_err(TransportError::request)
    }
}
