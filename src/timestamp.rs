//! Fast parsing of the `YYYY-MM-DDThh:mm:ssZ` timestamps GPX uses for `<time>`.
//!
//! Tracks carry thousands of points, so tokens are read as fixed-width digit
//! runs at known byte offsets instead of going through a general date grammar.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use tracing::debug;

use crate::error::GpxWaypointError;

type Result<T> = std::result::Result<T, GpxWaypointError>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Byte length of `YYYY-MM-DDThh:mm:ss`, i.e. everything before the optional
/// fraction and the trailing `Z`.
const SECONDS_END: usize = 19;

/// Gregorian calendar pinned to a zero UTC offset.
#[derive(Debug)]
pub struct UtcCalendar {
    offset: FixedOffset,
}

impl UtcCalendar {
    fn gregorian_utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Compose a UTC instant from scanned components. Out of range
    /// components (month 13, February 30th, hour 24) yield `None`.
    fn compose(&self, c: &DateComponents) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(c.year, c.month, c.day)?;
        let time = NaiveTime::from_hms_opt(c.hour, c.minute, c.second)?;
        self.offset
            .from_local_datetime(&NaiveDateTime::new(date, time))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The process-wide calendar, built on first use.
pub fn calendar() -> &'static UtcCalendar {
    static CALENDAR: OnceLock<UtcCalendar> = OnceLock::new();

    CALENDAR.get_or_init(UtcCalendar::gregorian_utc)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateComponents {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

/// Parse an optional GPX timestamp. Missing and malformed input both
/// resolve to `None`.
pub fn parse_timestamp(text: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text?;
    match try_parse_timestamp(text) {
        Ok(time) => Some(time),
        Err(e) => {
            debug!(error = %e, "dropping malformed timestamp");
            None
        }
    }
}

/// Parse a GPX timestamp, reporting malformed input.
pub fn try_parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    scan(text.as_bytes())
        .and_then(|components| calendar().compose(&components))
        .ok_or_else(|| GpxWaypointError::MalformedTimestamp {
            value: text.to_string(),
        })
}

/// Format a timestamp the way it is written into `<time>`.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

fn scan(bytes: &[u8]) -> Option<DateComponents> {
    let literal = |at: usize, expected: u8| bytes.get(at) == Some(&expected);

    if !(literal(4, b'-')
        && literal(7, b'-')
        && literal(10, b'T')
        && literal(13, b':')
        && literal(16, b':'))
    {
        return None;
    }

    let components = DateComponents {
        year: i32::try_from(digits(bytes, 0, 4)?).ok()?,
        month: digits(bytes, 5, 2)?,
        day: digits(bytes, 8, 2)?,
        hour: digits(bytes, 11, 2)?,
        minute: digits(bytes, 14, 2)?,
        second: digits(bytes, 17, 2)?,
    };

    // Sub-second digits are accepted and dropped.
    let rest = match bytes.get(SECONDS_END..)? {
        [b'.', fraction @ ..] => {
            let len = fraction.iter().take_while(|b| b.is_ascii_digit()).count();
            if len == 0 {
                return None;
            }
            &fraction[len..]
        }
        rest => rest,
    };

    (rest == b"Z").then_some(components)
}

/// Read exactly `width` ASCII digits starting at `start`.
fn digits(bytes: &[u8], start: usize, width: usize) -> Option<u32> {
    bytes
        .get(start..start + width)?
        .iter()
        .try_fold(0u32, |acc, b| {
            b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
        })
}
