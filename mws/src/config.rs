//! Gateway client configuration.
//!
//! A [`GatewayConfig`] is built once, handed to the client and never
//! changed afterwards. It can be assembled in code:
//!
//! ```
//! use mws::config::GatewayConfig;
//!
//! let config = GatewayConfig::new("175720", "10643")
//!     .with_credentials("lib/shop.cer", "lib/private.key", "secret")
//!     .with_testing(false);
//! assert_eq!(config.base_url().unwrap(), "https://penelope.yamoney.ru");
//! ```
//!
//! or deserialized (the CLI reads it from TOML):
//!
//! ```toml
//! shop_id = 175720
//! currency = 10643
//! testing = true
//! cert = "lib/shop.cer"
//! private_key = "lib/private.key"
//! cert_password = "$MWS_CERT_PASSWORD"
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::ConfigurationError;
use crate::operation::{Operation, PRODUCTION_HOST, TESTING_HOST};
use crate::signer::SigningCredentials;

/// Merchant authentication mode.
///
/// With [`SecurityType::Pkcs7`] the signing credentials are checked when
/// the client is built; with [`SecurityType::Md5`] they are only required
/// once a signed operation is issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityType {
    /// Shared-secret mode.
    #[default]
    #[serde(rename = "MD5")]
    Md5,
    /// Certificate mode.
    #[serde(rename = "PKCS7")]
    Pkcs7,
}

/// Immutable settings of a [`GatewayClient`](crate::client::GatewayClient).
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL overriding the built-in environments.
    #[serde(default)]
    pub host: Option<String>,

    /// Selects the demo environment when no `host` is set (default: `true`).
    #[serde(default = "default_testing")]
    pub testing: bool,

    /// Merchant shop identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub shop_id: String,

    /// Currency code sent with refunds and depositions (e.g. `10643`).
    #[serde(deserialize_with = "string_or_number")]
    pub currency: String,

    /// Merchant certificate (PEM), used for signing and TLS client auth.
    #[serde(default)]
    pub cert: Option<PathBuf>,

    /// Private key of `cert` (PEM).
    #[serde(default)]
    pub private_key: Option<PathBuf>,

    /// Passphrase of `private_key`.
    #[serde(default)]
    pub cert_password: Option<String>,

    /// Authentication mode (default: `MD5`).
    #[serde(default)]
    pub security_type: SecurityType,

    /// Verify the gateway's server certificate (default: `false`).
    #[serde(default)]
    pub verify_peer: bool,

    /// Limit on one HTTP exchange, in milliseconds (default: `30000`).
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Limit on one signing run, in milliseconds (default: `30000`).
    #[serde(default = "default_timeout_ms")]
    pub signing_timeout_ms: u64,

    /// `openssl` binary used for signing (default: `openssl` from `PATH`).
    #[serde(default = "default_openssl")]
    pub openssl: PathBuf,
}

const fn default_testing() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    30_000
}

/// Whole milliseconds in `timeout`, rounded up so that a non-zero
/// duration never becomes zero.
fn millis_ceil(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

fn default_openssl() -> PathBuf {
    PathBuf::from("openssl")
}

/// Accepts `175720` as well as `"175720"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}

impl GatewayConfig {
    /// Creates a demo-environment configuration for `shop_id` / `currency`.
    pub fn new(shop_id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            host: None,
            testing: default_testing(),
            shop_id: shop_id.into(),
            currency: currency.into(),
            cert: None,
            private_key: None,
            cert_password: None,
            security_type: SecurityType::default(),
            verify_peer: false,
            request_timeout_ms: default_timeout_ms(),
            signing_timeout_ms: default_timeout_ms(),
            openssl: default_openssl(),
        }
    }

    /// Sends every request to `host` instead of the built-in environments.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Chooses between the demo (`true`) and production environments.
    #[must_use]
    pub const fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    /// Sets certificate, key and key passphrase.
    #[must_use]
    pub fn with_credentials(
        mut self,
        cert: impl Into<PathBuf>,
        private_key: impl Into<PathBuf>,
        cert_password: impl Into<String>,
    ) -> Self {
        self.cert = Some(cert.into());
        self.private_key = Some(private_key.into());
        self.cert_password = Some(cert_password.into());
        self
    }

    /// Sets the authentication mode.
    #[must_use]
    pub const fn with_security_type(mut self, security_type: SecurityType) -> Self {
        self.security_type = security_type;
        self
    }

    /// Enables or disables server certificate verification.
    #[must_use]
    pub const fn with_verify_peer(mut self, verify_peer: bool) -> Self {
        self.verify_peer = verify_peer;
        self
    }

    /// Sets the HTTP timeout, with millisecond precision.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = millis_ceil(timeout);
        self
    }

    /// Sets the signing timeout, with millisecond precision.
    #[must_use]
    pub fn with_signing_timeout(mut self, timeout: Duration) -> Self {
        self.signing_timeout_ms = millis_ceil(timeout);
        self
    }

    /// Uses a specific `openssl` binary.
    #[must_use]
    pub fn with_openssl(mut self, program: impl Into<PathBuf>) -> Self {
        self.openssl = program.into();
        self
    }

    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Signing timeout as a [`Duration`].
    #[must_use]
    pub const fn signing_timeout(&self) -> Duration {
        Duration::from_millis(self.signing_timeout_ms)
    }

    /// Checks that both timeouts are non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroTimeout`] naming the first zero timeout.
    pub const fn check_timeouts(&self) -> Result<(), ConfigurationError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigurationError::ZeroTimeout("request"));
        }
        if self.signing_timeout_ms == 0 {
            return Err(ConfigurationError::ZeroTimeout("signing"));
        }
        Ok(())
    }

    /// Resolves the gateway base URL, without a trailing slash.
    ///
    /// The `host` override wins, then the demo environment if `testing`
    /// is set, then production.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidHost`] if the override is not an
    /// absolute URL.
    pub fn base_url(&self) -> Result<String, ConfigurationError> {
        match self.host.as_deref().filter(|h| !h.is_empty()) {
            Some(host) => {
                Url::parse(host).map_err(|source| ConfigurationError::InvalidHost {
                    host: host.to_owned(),
                    source,
                })?;
                Ok(host.trim_end_matches('/').to_owned())
            }
            None if self.testing => Ok(TESTING_HOST.to_owned()),
            None => Ok(PRODUCTION_HOST.to_owned()),
        }
    }

    /// Full endpoint URL of `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidHost`] if the override is invalid.
    pub fn endpoint(&self, operation: Operation) -> Result<String, ConfigurationError> {
        Ok(operation.url(&self.base_url()?))
    }

    /// Returns the credentials needed to sign XML requests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingCredential`] naming the first
    /// absent (or empty) item.
    pub fn signing_credentials(&self) -> Result<SigningCredentials, ConfigurationError> {
        let cert = self
            .cert
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigurationError::MissingCredential("certificate"))?;
        let private_key = self
            .private_key
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigurationError::MissingCredential("private key"))?;
        let passphrase = self
            .cert_password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigurationError::MissingCredential("key passphrase"))?;
        Ok(SigningCredentials {
            cert,
            private_key,
            passphrase,
        })
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("testing", &self.testing)
            .field("shop_id", &self.shop_id)
            .field("currency", &self.currency)
            .field("cert", &self.cert)
            .field("private_key", &self.private_key)
            .field("has_cert_password", &self.cert_password.is_some())
            .field("security_type", &self.security_type)
            .field("verify_peer", &self.verify_peer)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("signing_timeout_ms", &self.signing_timeout_ms)
            .field("openssl", &self.openssl)
            .finish()
    }
}
