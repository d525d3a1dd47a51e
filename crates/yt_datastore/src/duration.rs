//! ISO-8601 durations, as returned in YouTube's `contentDetails.duration`.

use std::{str::FromStr, sync::LazyLock};

use regex::{Captures, Regex};
use sqlx::postgres::types::PgInterval;

static ISO_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<sign>[-+])?P
        (?:(?P<years>[0-9]+)Y)?
        (?:(?P<months>[0-9]+)M)?
        (?:(?P<weeks>[0-9]+)W)?
        (?:(?P<days>[0-9]+)D)?
        (?:T
            (?:(?P<hours>[0-9]+(?:[.,][0-9]+)?)H)?
            (?:(?P<minutes>[0-9]+(?:[.,][0-9]+)?)M)?
            (?:(?P<seconds>[0-9]+(?:[.,][0-9]+)?)S)?
        )?$",
    )
    .unwrap()
});

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("'{0}' is not an ISO-8601 duration")]
    Invalid(String),

    #[error("'{0}' does not fit in an interval")]
    Overflow(String),
}

/// A parsed ISO-8601 duration, kept in the same three buckets as a
/// PostgreSQL `INTERVAL` so calendar units are not flattened into seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsoDuration {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}

impl IsoDuration {
    /// Whole seconds; an `i32` always fits once scaled to microseconds
    pub fn from_seconds(seconds: i32) -> Self {
        Self {
            months: 0,
            days: 0,
            microseconds: i64::from(seconds) * MICROS_PER_SECOND,
        }
    }
}

impl FromStr for IsoDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || DurationParseError::Invalid(s.to_string());
        let overflow = || DurationParseError::Overflow(s.to_string());

        let caps = ISO_DURATION_RE.captures(input).ok_or_else(invalid)?;

        const UNITS: [&str; 7] = [
            "years", "months", "weeks", "days", "hours", "minutes", "seconds",
        ];
        // "P" and "PT" alone match the pattern but carry no components
        if UNITS.iter().all(|unit| caps.name(unit).is_none()) || input.ends_with('T') {
            return Err(invalid());
        }

        let whole = |unit: &str| -> Result<i32, DurationParseError> {
            caps.name(unit)
                .map_or(Ok(0), |m| m.as_str().parse::<i32>().map_err(|_| overflow()))
        };

        let (years, months, weeks, days) =
            (whole("years")?, whole("months")?, whole("weeks")?, whole("days")?);
        let months = years
            .checked_mul(12)
            .and_then(|m| m.checked_add(months))
            .ok_or_else(overflow)?;
        let days = weeks
            .checked_mul(7)
            .and_then(|d| d.checked_add(days))
            .ok_or_else(overflow)?;

        let microseconds = [
            ("hours", MICROS_PER_HOUR),
            ("minutes", MICROS_PER_MINUTE),
            ("seconds", MICROS_PER_SECOND),
        ]
        .into_iter()
        .try_fold(0i64, |acc, (unit, scale)| {
            decimal_micros(&caps, unit, scale).and_then(|v| acc.checked_add(v))
        })
        .ok_or_else(overflow)?;

        let duration = IsoDuration {
            months,
            days,
            microseconds,
        };

        Ok(match caps.name("sign").map(|m| m.as_str()) {
            Some("-") => IsoDuration {
                months: -duration.months,
                days: -duration.days,
                microseconds: -duration.microseconds,
            },
            _ => duration,
        })
    }
}

/// Converts a possibly fractional component into microseconds. Digits past
/// microsecond precision are truncated.
fn decimal_micros(caps: &Captures<'_>, unit: &str, scale: i64) -> Option<i64> {
    let Some(m) = caps.name(unit) else {
        return Some(0);
    };

    let (int_part, frac_part) = m
        .as_str()
        .split_once(['.', ','])
        .unwrap_or((m.as_str(), ""));

    let int_micros = int_part.parse::<i64>().ok()?.checked_mul(scale)?;

    let frac_digits = frac_part.get(..frac_part.len().min(9))?;
    if frac_digits.is_empty() {
        return Some(int_micros);
    }
    let numerator = frac_digits.parse::<i128>().ok()?;
    let denominator = 10i128.pow(frac_digits.len() as u32);
    let frac_micros = i64::try_from(numerator * scale as i128 / denominator).ok()?;

    int_micros.checked_add(frac_micros)
}

impl From<IsoDuration> for PgInterval {
    fn from(d: IsoDuration) -> Self {
        PgInterval {
            months: d.months,
            days: d.days,
            microseconds: d.microseconds,
        }
    }
}
