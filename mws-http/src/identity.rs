//! TLS client identity of the merchant.
//!
//! The gateway authenticates merchants by their client certificate. The
//! certificate and its private key are usually two PEM files, and the key
//! is usually encrypted. The TLS stack wants a single plaintext PEM bundle,
//! so encrypted keys are decrypted once, at load time, with `openssl pkey`.

use std::path::Path;

use mws::signer::OpensslSigner;

use crate::error::IdentityError;

/// PEM bundle holding the private key followed by the certificate.
#[derive(Clone)]
pub struct ClientIdentity {
    pem: Vec<u8>,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("pem_len", &self.pem.len())
            .finish()
    }
}

impl ClientIdentity {
    /// Builds an identity from in-memory plaintext PEM data.
    #[must_use]
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Self {
        let mut pem = Vec::with_capacity(key_pem.len() + cert_pem.len() + 1);
        pem.extend_from_slice(key_pem);
        if !pem.is_empty() && !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend_from_slice(cert_pem);
        Self { pem }
    }

    /// Loads the identity from disk.
    ///
    /// `key` may be omitted when `cert` already bundles the key. An
    /// encrypted key is decrypted with `passphrase` through `openssl`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if a file cannot be read, the key is
    /// encrypted without a passphrase, or decryption fails.
    pub async fn load(
        cert: &Path,
        key: Option<&Path>,
        passphrase: Option<&str>,
        openssl: &OpensslSigner,
    ) -> Result<Self, IdentityError> {
        let cert_pem = read(cert)?;
        let Some(key) = key else {
            return Ok(Self { pem: cert_pem });
        };

        let key_pem = read(key)?;
        let key_pem = if is_encrypted(&key_pem) {
            let passphrase = passphrase
                .filter(|p| !p.is_empty())
                .ok_or_else(|| IdentityError::MissingPassphrase(key.to_path_buf()))?;
            openssl.decrypt_private_key(key, passphrase).await?
        } else {
            key_pem
        };
        Ok(Self::from_pem(&cert_pem, &key_pem))
    }

    /// The bundled PEM data.
    #[must_use]
    pub fn pem(&self) -> &[u8] {
        &self.pem
    }

    /// Converts into a `reqwest` identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Tls`] if the bundle is not a usable key/certificate pair.
    pub fn to_reqwest(&self) -> Result<reqwest::Identity, IdentityError> {
        reqwest::Identity::from_pem(&self.pem).map_err(IdentityError::Tls)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, IdentityError> {
    std::fs::read(path).map_err(|source| IdentityError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `pem` holds an encrypted key, in PKCS#8 or legacy OpenSSL form.
fn is_encrypted(pem: &[u8]) -> bool {
    let text = String::from_utf8_lossy(pem);
    text.contains("BEGIN ENCRYPTED PRIVATE KEY") || text.contains("Proc-Type: 4,ENCRYPTED")
}
