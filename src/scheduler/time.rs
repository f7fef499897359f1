//! Time context for scheduling decisions
//!
//! All grouping and slot logic works on comparable instants
//! (`DateTime<FixedOffset>`). This module owns the conversion between those
//! instants and the configured IANA timezone: parsing the calendar's
//! timestamp strings, resolving local calendar days, building slot instants
//! and rendering timestamps for the downstream API.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use thiserror::Error;

use super::error::{SchedulerError, SchedulerResult};

/// Default scheduling timezone
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Naive layouts accepted for timestamps without an offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Timestamp parsing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Empty timestamp string
    #[error("timestamp is empty")]
    Empty,

    /// No accepted layout matched
    #[error("unrecognized timestamp '{0}'")]
    Unrecognized(String),
}

/// Timezone-aware view over instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeContext {
    tz: Tz,
}

impl TimeContext {
    /// Create a context for a timezone
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Create a context from an IANA timezone name
    pub fn from_name(name: &str) -> SchedulerResult<Self> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| SchedulerError::invalid_timezone(name))
    }

    /// Configured timezone
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Current instant in the configured zone
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz).fixed_offset()
    }

    /// Instant expressed in the configured zone
    pub fn localize(&self, instant: DateTime<FixedOffset>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Calendar day of an instant in the configured zone
    pub fn local_date(&self, instant: DateTime<FixedOffset>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    /// Local wall-clock time of an instant
    pub fn local_time(&self, instant: DateTime<FixedOffset>) -> NaiveTime {
        self.localize(instant).time()
    }

    /// Instant for a local date and wall-clock time
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant.
    /// Nonexistent times (DST spring-forward gap) move forward one hour.
    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
        self.resolve_local(self.tz, date.and_time(time))
    }

    /// Start of a local day
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        self.at(date, NaiveTime::MIN)
    }

    /// Parse a calendar timestamp
    ///
    /// Strings carrying an offset (RFC 3339, or `%z` suffixed) keep it.
    /// Naive strings are read in `zone_hint` when that names a valid IANA
    /// zone, otherwise in the configured zone.
    pub fn parse(
        &self,
        raw: &str,
        zone_hint: Option<&str>,
    ) -> Result<DateTime<FixedOffset>, TimestampError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TimestampError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt);
        }
        if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Ok(dt);
        }

        let zone = zone_hint
            .and_then(|name| name.trim().parse::<Tz>().ok())
            .unwrap_or(self.tz);

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| self.resolve_local(zone, naive))
            .ok_or_else(|| TimestampError::Unrecognized(raw.to_string()))
    }

    /// Render an instant for the downstream scheduling API
    ///
    /// RFC 3339 with the configured zone's offset at that instant.
    pub fn format_api(&self, instant: DateTime<FixedOffset>) -> String {
        self.localize(instant).to_rfc3339()
    }

    /// Render an instant as local `YYYY-MM-DD HH:MM`
    pub fn format_local(&self, instant: DateTime<FixedOffset>) -> String {
        self.localize(instant).format("%Y-%m-%d %H:%M").to_string()
    }

    /// Render the local wall-clock time as `HH:MM`
    pub fn format_clock(&self, instant: DateTime<FixedOffset>) -> String {
        self.localize(instant).format("%H:%M").to_string()
    }

    fn resolve_local(&self, zone: Tz, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        match zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.fixed_offset(),
            LocalResult::Ambiguous(earliest, _) => earliest.fixed_offset(),
            LocalResult::None => {
                let shifted = naive + Duration::hours(1);
                match zone.from_local_datetime(&shifted).earliest() {
                    Some(dt) => dt.fixed_offset(),
                    None => zone.from_utc_datetime(&naive).fixed_offset(),
                }
            }
        }
    }
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::new(chrono_tz::America::New_York)
    }
}

/// Day name (e.g. `Monday`) for a date
pub fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}
