//! Timestamp utilities for MWS requests.
//!
//! The gateway expects two textual timestamp flavours in `requestDT`-style
//! fields, plus a Unix timestamp that doubles as the `clientOrderId` of
//! money-moving operations:
//!
//! - [`format_date`] — `2024-03-01T13:45:30.000+03:00`, used by payment operations
//! - [`format_date_for_mws`] — `2024-03-01T13:45:30.000Z`, used by the listing operations
//! - [`UnixTimestamp`] — seconds since the Unix epoch
//!
//! The current time is read through a [`Clock`] so that callers (and tests)
//! can pin it.

use std::fmt::{Display, Formatter};
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Local, TimeZone};

/// Formats `t` as `YYYY-MM-DDTHH:mm:ss.000±HH:MM`.
///
/// The millisecond field is always `000` and the offset is the one carried
/// by `t`.
pub fn format_date<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%Y-%m-%dT%H:%M:%S.000%:z").to_string()
}

/// Formats `t` as `YYYY-MM-DDTHH:mm:ss.000Z`.
///
/// The wall-clock time of `t` is written as-is, followed by a literal `Z`.
/// No conversion to UTC takes place: a `13:45:30+03:00` input produces
/// `13:45:30.000Z`. The gateway has always been fed this shape, so it is
/// kept even though the suffix mislabels non-UTC clocks.
pub fn format_date_for_mws<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// A Unix timestamp representing seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// Money-moving operations send it as `clientOrderId`, so two calls issued
/// within the same second share an id.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq)]
pub struct UnixTimestamp(u64);

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the timestamp of a calendar instant, clamping pre-epoch values to zero.
    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(t: &DateTime<Tz>) -> Self {
        Self(u64::try_from(t.timestamp()).unwrap_or(0))
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// A clock set before the Unix epoch yields zero.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(now)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

/// Source of "now" for request assembly.
pub trait Clock: Send + Sync {
    /// Returns the current instant together with the local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// [`Clock`] backed by the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// [`Clock`] that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<FixedOffset>);

impl FixedClock {
    /// Creates a clock frozen at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
