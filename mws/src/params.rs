//! Ordered request parameters.
//!
//! [`RequestParams`] is the mapping every operation assembles before it is
//! handed to an encoder. Values are already strings when they are inserted:
//! amounts carry their final decimal text and booleans are `true`/`false`.
//! Encoders serialize the mapping as-is and never reformat a value.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

/// Insertion-ordered name → value mapping.
///
/// Re-inserting an existing name replaces its value in place, so the
/// original position is kept.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, String)>,
}

impl RequestParams {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry whose value is falsy: empty, `"0"` or `"false"`.
    #[must_use]
    pub fn without_falsy(mut self) -> Self {
        self.entries.retain(|(_, v)| !is_falsy(v));
        self
    }
}

impl fmt::Debug for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

fn is_falsy(value: &str) -> bool {
    matches!(value, "" | "0" | "false")
}

/// Formats an amount with exactly two decimal places, rounding half away from zero.
#[must_use]
pub fn fixed_two_decimals(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Formats a boolean flag the way the gateway expects it.
#[must_use]
pub const fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
