//! Calendar-day keys and the policy that derives them from instants.
//!
//! Every daily record is addressed by a [`DayKey`]. Which calendar day an
//! instant belongs to depends on the configured [`DayBoundary`]; the
//! [`DayKeyResolver`] pairs that policy with an injectable clock so "today"
//! is deterministic under test.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Error raised when a day key cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("day key must be a calendar date formatted as YYYY-MM-DD, got '{value}'")]
pub struct DayKeyParseError {
    value: String,
}

/// Canonical calendar-day identifier.
///
/// Serialises as `YYYY-MM-DD`. Ordering follows the calendar.
///
/// # Examples
/// ```
/// use waterlog::domain::DayKey;
///
/// let key: DayKey = "2024-03-01".parse().expect("valid day key");
/// assert_eq!(key.previous_days(1).to_string(), "2024-02-29");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Wrap a calendar date.
    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Underlying calendar date.
    #[must_use]
    pub const fn as_date(&self) -> NaiveDate {
        self.0
    }

    /// Key `days` calendar days earlier, saturating at the earliest
    /// representable date.
    #[must_use]
    pub fn previous_days(self, days: u32) -> Self {
        Self(
            self.0
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Key one calendar day later, saturating at the latest representable date.
    #[must_use]
    pub fn next_day(self) -> Self {
        Self(self.0.succ_opt().unwrap_or(NaiveDate::MAX))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = DayKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| DayKeyParseError {
                value: s.to_owned(),
            })
    }
}

impl TryFrom<String> for DayKey {
    type Error = DayKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(value: DayKey) -> Self {
        value.to_string()
    }
}

/// Error raised when a day-boundary policy string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("day boundary must be 'utc', 'local', or an offset such as '+02:00', got '{value}'")]
pub struct DayBoundaryParseError {
    value: String,
}

/// Policy deciding where one calendar day ends and the next begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayBoundary {
    /// Midnight UTC.
    Utc,
    /// Midnight in the host's local time zone.
    #[default]
    Local,
    /// Midnight at a fixed UTC offset.
    Fixed(FixedOffset),
}

impl DayBoundary {
    /// Calendar date `instant` falls on under this policy.
    #[must_use]
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Utc => instant.date_naive(),
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("utc"),
            Self::Local => f.write_str("local"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1_i32, raw.get(1..)?),
        b'-' => (-1_i32, raw.get(1..)?),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some(pair) => pair,
        None if rest.len() == 4 => (rest.get(..2)?, rest.get(2..)?),
        None => (rest, "00"),
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl FromStr for DayBoundary {
    type Err = DayBoundaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "utc" | "z" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => parse_offset(trimmed)
                .map(Self::Fixed)
                .ok_or_else(|| DayBoundaryParseError {
                    value: s.to_owned(),
                }),
        }
    }
}

/// Ordering of keys returned by [`DayKeyResolver::range_last_n_days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOrder {
    /// Earliest day first.
    OldestFirst,
    /// Latest day first.
    NewestFirst,
}

/// Maps instants to [`DayKey`]s using a fixed boundary policy and clock.
#[derive(Clone)]
pub struct DayKeyResolver {
    boundary: DayBoundary,
    clock: Arc<dyn Clock>,
}

impl DayKeyResolver {
    /// Create a resolver from a policy and clock.
    pub fn new(boundary: DayBoundary, clock: Arc<dyn Clock>) -> Self {
        Self { boundary, clock }
    }

    /// Configured day-boundary policy.
    #[must_use]
    pub const fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    /// Current instant according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Day key `instant` belongs to.
    #[must_use]
    pub fn resolve(&self, instant: DateTime<Utc>) -> DayKey {
        DayKey(self.boundary.date_of(instant))
    }

    /// Day key for the clock's current instant.
    #[must_use]
    pub fn today(&self) -> DayKey {
        self.resolve(self.now())
    }

    /// Every key in `[anchor - n days, anchor]`, inclusive of both ends.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use waterlog::domain::{DayBoundary, DayKey, DayKeyResolver, DayOrder};
    ///
    /// let resolver = DayKeyResolver::new(DayBoundary::Utc, Arc::new(DefaultClock));
    /// let anchor: DayKey = "2024-01-02".parse().expect("valid day key");
    /// let keys = resolver.range_last_n_days(2, anchor, DayOrder::OldestFirst);
    /// let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
    /// assert_eq!(rendered, ["2023-12-31", "2024-01-01", "2024-01-02"]);
    /// ```
    #[must_use]
    pub fn range_last_n_days(&self, n: u32, anchor: DayKey, order: DayOrder) -> Vec<DayKey> {
        let start = anchor.previous_days(n);
        let mut keys = Vec::new();
        let mut cursor = start;
        loop {
            keys.push(cursor);
            if cursor >= anchor {
                break;
            }
            cursor = cursor.next_day();
        }
        if order == DayOrder::NewestFirst {
            keys.reverse();
        }
        keys
    }
}

impl fmt::Debug for DayKeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DayKeyResolver")
            .field("boundary", &self.boundary)
            .finish_non_exhaustive()
    }
}
