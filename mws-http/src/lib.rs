//! HTTPS transport for the MWS gateway client.
//!
//! Implements [`mws::transport::Transport`] on top of `reqwest`, presenting
//! the merchant's TLS client certificate on every request.
//!
//! # Modules
//!
//! - [`transport`] - [`HttpTransport`] and its settings
//! - [`identity`] - Loading (and decrypting) the client certificate and key
//! - [`error`] - Identity and client construction errors

pub mod error;
pub mod identity;
pub mod transport;

pub use error::{HttpTransportError, IdentityError};
pub use identity::ClientIdentity;
pub use transport::{HttpTransport, HttpTransportConfig};
