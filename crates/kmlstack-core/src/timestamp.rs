//! Timestamp normalization
//!
//! Forensic KML exports carry capture times in whatever encoding the source
//! device or vendor tool produced. This module reduces them to one canonical
//! UTC representation through an ordered list of pattern recognizers.
//!
//! The priority order is fixed and load-bearing, because some encodings are
//! subsets of others:
//!
//! 1. ISO 8601 / RFC 3339 with an explicit UTC offset
//! 2. ISO 8601 date-time without an offset, assumed UTC
//! 3. Locale date-times (`2023-05-01 12:00:00`, `01.05.2023 12:00`, ...),
//!    assumed UTC
//! 4. Unix epoch numerics, disambiguated by digit count (13 digits are
//!    milliseconds, 10 are seconds; other lengths are rejected)
//! 5. Date-only forms, completed with a configured time of day and flagged
//!    [`Precision::DateOnly`]
//!
//! The first matching pattern wins. An unrecognized value is "absent", never
//! an error: the owning point is kept with no timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Precision of a normalized timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// The source value carried a time of day.
    Full,
    /// The source value was a bare date; the time of day is a configured
    /// default, not an observation.
    DateOnly,
}

/// How date-only values are classified in timestamp statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DateOnlyPolicy {
    /// A bare date still counts as "with timestamp".
    #[default]
    CountAsTimestamped,
    /// Only values with an observed time of day count as "with timestamp".
    CountAsMissing,
}

impl DateOnlyPolicy {
    /// Whether a value of the given precision counts as "with timestamp".
    pub fn accepts(&self, precision: Precision) -> bool {
        match (self, precision) {
            (DateOnlyPolicy::CountAsMissing, Precision::DateOnly) => false,
            _ => true,
        }
    }
}

/// A timestamp normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTimestamp {
    pub value: DateTime<Utc>,
    pub precision: Precision,
}

/// Value produced by one pattern, before date-only completion.
enum PatternValue {
    Instant(DateTime<Utc>),
    Date(NaiveDate),
}

/// One recognizer in the priority list.
struct TimestampPattern {
    name: &'static str,
    parse: fn(&str) -> Option<PatternValue>,
}

/// Recognizers in priority order. New vendor formats are added here, never as
/// branching inside the normalizer.
const PATTERNS: &[TimestampPattern] = &[
    TimestampPattern { name: "iso-8601-offset", parse: parse_rfc3339 },
    TimestampPattern { name: "iso-8601-naive", parse: parse_iso_naive },
    TimestampPattern { name: "locale-datetime", parse: parse_locale_datetime },
    TimestampPattern { name: "unix-epoch", parse: parse_epoch },
    TimestampPattern { name: "date-only", parse: parse_date_only },
];

const ISO_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

const LOCALE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_ONLY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

fn parse_rfc3339(value: &str) -> Option<PatternValue> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| PatternValue::Instant(parsed.with_timezone(&Utc)))
}

fn parse_iso_naive(value: &str) -> Option<PatternValue> {
    ISO_NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| PatternValue::Instant(naive.and_utc()))
    })
}

fn parse_locale_datetime(value: &str) -> Option<PatternValue> {
    LOCALE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| PatternValue::Instant(naive.and_utc()))
    })
}

fn parse_epoch(value: &str) -> Option<PatternValue> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let instant = match value.len() {
        13 => value.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis),
        10 => value
            .parse::<i64>()
            .ok()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
        _ => None,
    }?;
    Some(PatternValue::Instant(instant))
}

fn parse_date_only(value: &str) -> Option<PatternValue> {
    DATE_ONLY_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .map(PatternValue::Date)
    })
}

/// Normalizes heterogeneous timestamp strings to [`CanonicalTimestamp`].
///
/// Pure and deterministic for a given configuration: the same input always
/// yields the same output.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    date_only_time: NaiveTime,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new(NaiveTime::MIN)
    }
}

impl TimestampNormalizer {
    /// `date_only_time` completes bare dates (midnight in the default
    /// configuration).
    pub fn new(date_only_time: NaiveTime) -> Self {
        Self { date_only_time }
    }

    /// Normalize one raw value. Empty or whitespace-only input is "not
    /// present". Unrecognized input yields `None`, never an error.
    pub fn normalize(&self, raw: &str) -> Option<CanonicalTimestamp> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        for pattern in PATTERNS {
            if let Some(parsed) = (pattern.parse)(value) {
                tracing::trace!(pattern = pattern.name, "timestamp pattern matched");
                return Some(match parsed {
                    PatternValue::Instant(value) => CanonicalTimestamp {
                        value,
                        precision: Precision::Full,
                    },
                    PatternValue::Date(date) => CanonicalTimestamp {
                        value: date.and_time(self.date_only_time).and_utc(),
                        precision: Precision::DateOnly,
                    },
                });
            }
        }

        None
    }
}
