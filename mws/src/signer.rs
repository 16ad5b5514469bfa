//! PKCS#7 request signing.
//!
//! Signed operations send their XML document inside an S/MIME envelope:
//! the document is signed with the merchant's private key, the signature
//! is attached (not detached) and the whole thing is PEM-armoured. Neither
//! the certificate chain nor the signer certificate is embedded; the
//! gateway already knows the merchant's certificate.
//!
//! [`Signer`] is the seam the client signs through. [`OpensslSigner`] is the
//! production implementation and shells out to the `openssl` binary:
//!
//! ```text
//! openssl smime -sign -signer <cert> -inkey <key> -nochain -nocerts \
//!     -outform PEM -nodetach -passin pass:<passphrase>
//! ```
//!
//! The passphrase travels on the command line (and therefore shows up in
//! the process table and in the diagnostic log). The gateway integration has
//! always been driven this way; switching to `-passin env:` or `fd:` is a
//! drop-in hardening step for deployments that care.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::encoding::PKCS7_SUBTYPE;
use crate::error::SigningError;
use crate::log::Logger;

/// Certificate, key and passphrase used to sign a request.
#[derive(Clone)]
pub struct SigningCredentials {
    /// Signer certificate (PEM).
    pub cert: PathBuf,
    /// Private key matching `cert` (PEM, usually encrypted).
    pub private_key: PathBuf,
    /// Passphrase of `private_key`.
    pub passphrase: String,
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("cert", &self.cert)
            .field("private_key", &self.private_key)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// A signed request body, ready to be sent as `application/pkcs7-mime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    payload: Vec<u8>,
}

impl SignedEnvelope {
    /// Wraps an already signed payload.
    #[must_use]
    pub const fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// MIME subtype of the payload.
    #[must_use]
    pub const fn subtype(&self) -> &'static str {
        PKCS7_SUBTYPE
    }

    /// Signed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the envelope, returning the signed bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.payload
    }
}

/// Produces signed envelopes for XML request documents.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs `body` with `credentials`.
    ///
    /// Implementations log what they ran and what it produced to `log`
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] if no envelope could be produced. A failed
    /// signature is never replaced by the unsigned body.
    async fn sign(
        &self,
        body: &[u8],
        credentials: &SigningCredentials,
        log: &dyn Logger,
    ) -> Result<SignedEnvelope, SigningError>;
}

/// [`Signer`] backed by the `openssl smime` command.
///
/// Every call spawns its own process, so one signer can serve concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct OpensslSigner {
    program: PathBuf,
    timeout: Duration,
}

impl Default for OpensslSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl OpensslSigner {
    /// Program looked up on `PATH` when none is configured.
    pub const DEFAULT_PROGRAM: &'static str = "openssl";

    /// Default limit on a single signing run.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a signer running `openssl` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(Self::DEFAULT_PROGRAM),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Uses a specific `openssl` binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Kills the signing process if it runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments of the `smime -sign` invocation.
    #[must_use]
    pub fn sign_args(credentials: &SigningCredentials) -> Vec<String> {
        vec![
            "smime".to_owned(),
            "-sign".to_owned(),
            "-signer".to_owned(),
            credentials.cert.display().to_string(),
            "-inkey".to_owned(),
            credentials.private_key.display().to_string(),
            "-nochain".to_owned(),
            "-nocerts".to_owned(),
            "-outform".to_owned(),
            "PEM".to_owned(),
            "-nodetach".to_owned(),
            "-passin".to_owned(),
            format!("pass:{}", credentials.passphrase),
        ]
    }

    /// The command line as it is written to the diagnostic log.
    #[must_use]
    pub fn command_line(&self, args: &[String]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Decrypts a PEM private key with `openssl pkey`.
    ///
    /// TLS client identities need the key in plaintext, while the key used
    /// for signing normally stays encrypted on disk.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] if `openssl` cannot be run or rejects the
    /// key or passphrase.
    pub async fn decrypt_private_key(
        &self,
        private_key: &Path,
        passphrase: &str,
    ) -> Result<Vec<u8>, SigningError> {
        let args = vec![
            "pkey".to_owned(),
            "-in".to_owned(),
            private_key.display().to_string(),
            "-passin".to_owned(),
            format!("pass:{passphrase}"),
        ];
        let output = self.run(&args, &[]).await?;
        if !output.status.success() {
            return Err(SigningError::Failed {
                status: output.status.code(),
                output: combined_output(&output),
            });
        }
        Ok(output.stdout)
    }

    /// Runs the program with `args`, feeding `input` on stdin.
    async fn run(&self, args: &[String], input: &[u8]) -> Result<Output, SigningError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SigningError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            return Err(SigningError::Io(std::io::Error::other(
                "stdin of the signing tool was not captured",
            )));
        };
        let feed = async move {
            let written = stdin.write_all(input).await;
            drop(stdin);
            written
        };

        let exchange = async {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            let output = output.map_err(SigningError::Io)?;
            // A tool that exits early closes its stdin; its exit status is the better diagnostic.
            if output.status.success() {
                fed.map_err(SigningError::Io)?;
            }
            Ok(output)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| SigningError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl Signer for OpensslSigner {
    async fn sign(
        &self,
        body: &[u8],
        credentials: &SigningCredentials,
        log: &dyn Logger,
    ) -> Result<SignedEnvelope, SigningError> {
        let args = Self::sign_args(credentials);
        log.info(&format!("opensslCommand: {}", self.command_line(&args)));

        let output = match self.run(&args, body).await {
            Ok(output) => output,
            Err(err) => {
                log.info(&err.to_string());
                return Err(err);
            }
        };

        let text = combined_output(&output);
        log.info(&text);

        if !output.status.success() {
            let err = SigningError::Failed {
                status: output.status.code(),
                output: text,
            };
            log.info(&err.to_string());
            return Err(err);
        }

        Ok(SignedEnvelope::new(output.stdout))
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
