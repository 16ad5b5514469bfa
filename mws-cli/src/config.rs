//! CLI configuration.
//!
//! Loads the gateway settings from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax, so secrets such as the key passphrase can stay out of the file.
//!
//! # Example Configuration
//!
//! ```toml
//! shop_id = 175720
//! currency = 10643
//! testing = true
//! cert = "lib/shop.cer"
//! private_key = "lib/private.key"
//! cert_password = "${MWS_CERT_PASSWORD}"
//! log_file = "yandex.log"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `mws.toml`)
//! - `MWS_HOST` — Override the gateway base URL
//! - Secrets referenced by `$VAR` in the config file

use std::path::{Path, PathBuf};

use mws::GatewayConfig;
use serde::Deserialize;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Gateway client settings.
    #[serde(flatten)]
    pub gateway: GatewayConfig,

    /// Append diagnostics to this file instead of the tracing output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    /// Loads configuration from `path`.
    ///
    /// All `$VAR` / `${VAR}` references are expanded from the process
    /// environment before parsing. `MWS_HOST` overrides the file's `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let mut config = Self::parse(&content)?;

        if let Ok(host) = std::env::var("MWS_HOST")
            && !host.is_empty()
        {
            config.gateway.host = Some(host);
        }

        Ok(config)
    }

    /// Parses TOML content after environment variable expansion.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid configuration.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(&expand_env_vars(content))
    }
}

fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Replaces each `$NAME` / `${NAME}` in `input` with `lookup(NAME)`.
///
/// A reference `lookup` cannot resolve is copied through unchanged, as is a
/// `$` that does not start a name (`5$ total`, an unterminated `${`).
fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        // `len` covers the braces, if any
        let (name, len) = match after.strip_prefix('{') {
            Some(braced) => braced.find('}').map_or(("", 0), |end| (&braced[..end], end + 2)),
            None => {
                let end = after
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        let value = if name.is_empty() { None } else { lookup(name) };
        match value {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[dollar..=dollar + len]),
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}
