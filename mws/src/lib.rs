#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client core for the Yandex.Money Merchant Web Services (MWS) protocol.
//!
//! MWS is the merchant-facing API of the payment gateway: listing orders
//! and refunds, refunding payments, capturing or cancelling deferred
//! payments, repeating card payments and paying out to wallets or cards.
//! This crate builds those requests. It picks the endpoint, assembles the
//! parameters, encodes them as a form or as a PKCS#7-signed XML document,
//! and hands the result to a [`transport::Transport`].
//!
//! # Modules
//!
//! - [`client`] - [`GatewayClient`] and its builder
//! - [`config`] - Immutable client configuration and endpoint resolution
//! - [`encoding`] - Form and XML body encoders
//! - [`error`] - Configuration, signing and transport errors
//! - [`log`] - Diagnostic log sinks
//! - [`operation`] - The fixed set of gateway operations
//! - [`params`] - Ordered request parameters
//! - [`signer`] - PKCS#7 signing through `openssl smime`
//! - [`timestamp`] - Protocol timestamp formats and clocks
//! - [`transport`] - The HTTP seam
//!
//! # Feature Flags
//!
//! - `telemetry` - Wraps every gateway call in a `tracing` span

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod log;
pub mod operation;
pub mod params;
pub mod signer;
pub mod timestamp;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{GatewayClient, GatewayResponse};
pub use config::{GatewayConfig, SecurityType};
pub use error::{ConfigurationError, LogFileError, MwsError, SigningError, TransportError};
pub use operation::{Operation, OperationRequest};
pub use params::RequestParams;
