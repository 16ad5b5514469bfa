//! `reqwest`-based [`Transport`] for the MWS gateway.
//!
//! The transport attaches the merchant's client certificate to every
//! request. Server certificates are not verified unless asked for: the
//! gateway's demo environment has historically served certificates that
//! do not validate, and merchants are authenticated by their own
//! certificate rather than by trusting the server's.

use std::time::Duration;

use async_trait::async_trait;
use mws::GatewayConfig;
use mws::error::TransportError;
use mws::signer::OpensslSigner;
use mws::transport::{Transport, TransportRequest, TransportResponse};
use reqwest::header::CONTENT_TYPE;

use crate::error::HttpTransportError;
use crate::identity::ClientIdentity;

/// Settings of an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Client identity presented to the gateway.
    pub identity: Option<ClientIdentity>,
    /// Verify the gateway's server certificate.
    pub verify_peer: bool,
    /// Limit on one exchange.
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            identity: None,
            verify_peer: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpTransportConfig {
    /// Sets the client identity.
    #[must_use]
    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Enables or disables server certificate verification.
    #[must_use]
    pub const fn with_verify_peer(mut self, verify_peer: bool) -> Self {
        self.verify_peer = verify_peer;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTPS transport backed by a shared [`reqwest::Client`].
///
/// # Example
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use mws::{GatewayClient, GatewayConfig};
/// use mws_http::HttpTransport;
///
/// let config = GatewayConfig::new("175720", "10643")
///     .with_credentials("lib/shop.cer", "lib/private.key", "secret");
/// let transport = HttpTransport::from_gateway_config(&config).await?;
/// let client = GatewayClient::builder(config).transport(transport).build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    verify_peer: bool,
}

impl HttpTransport {
    /// Builds a transport from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError`] if the identity is rejected by the TLS
    /// stack or the client cannot be built.
    pub fn new(config: HttpTransportConfig) -> Result<Self, HttpTransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_peer);
        if let Some(identity) = &config.identity {
            builder = builder.identity(identity.to_reqwest()?);
        }
        let client = builder.build().map_err(HttpTransportError::Client)?;
        Ok(Self {
            client,
            verify_peer: config.verify_peer,
        })
    }

    /// Builds a transport from the gateway configuration.
    ///
    /// The certificate (and key, if configured separately) become the client
    /// identity. An encrypted key is decrypted with the configured `openssl`
    /// binary and passphrase.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError`] if a timeout is zero, the identity
    /// cannot be loaded or the client cannot be built.
    pub async fn from_gateway_config(config: &GatewayConfig) -> Result<Self, HttpTransportError> {
        config.check_timeouts()?;
        let mut transport_config = HttpTransportConfig::default()
            .with_verify_peer(config.verify_peer)
            .with_timeout(config.request_timeout());

        if let Some(cert) = config.cert.as_deref().filter(|p| !p.as_os_str().is_empty()) {
            let openssl = OpensslSigner::new()
                .with_program(config.openssl.clone())
                .with_timeout(config.signing_timeout());
            let identity = ClientIdentity::load(
                cert,
                config.private_key.as_deref(),
                config.cert_password.as_deref(),
                &openssl,
            )
            .await?;
            transport_config = transport_config.with_identity(identity);
        } else {
            tracing::warn!("No client certificate configured; the gateway will reject requests");
        }

        Self::new(transport_config)
    }

    /// Whether server certificates are verified.
    #[must_use]
    pub const fn verify_peer(&self) -> bool {
        self.verify_peer
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, request.content_type.as_str())
            .body(request.body)
            .send()
            .await
            .map_err(TransportError::request)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::request)?;
        tracing::debug!(status, bytes = body.len(), "MWS response received");

        Ok(TransportResponse { status, body })
    }
}
