//! Date and time values.
//!
//! Dates and times are value objects independent of any calendar library.
//! A date is a year, month and day where month and day may be zero to mean
//! unspecified; a time is seconds since midnight plus nanoseconds, with a
//! stated precision and an optional timezone offset in 15-minute units.
//!
//! On the wire a date packs into 4 bytes (`year << 9 | month << 5 | day`),
//! a time into 8 (timezone byte, 4-bit precision, seconds, nanoseconds) and
//! a combined datetime is the two back to back.

use std::cmp::Ordering;

use crate::error::FudgeError;
use crate::message::field::Field;
use crate::types;

/// Largest year magnitude a packed date can carry.
pub const MAX_YEAR: i32 = 1_000_000;

/// Wire value of the timezone byte meaning no timezone.
const NO_TIMEZONE: i8 = -128;

/// How much of a date/time value is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precision {
    Millennium = 0,
    Century = 1,
    Year = 2,
    Month = 3,
    Day = 4,
    Hour = 5,
    Minute = 6,
    Second = 7,
    Millisecond = 8,
    Microsecond = 9,
    Nanosecond = 10,
}

impl Precision {
    /// Decodes the 4-bit wire form.
    pub fn from_wire(value: u8) -> Result<Self, FudgeError> {
        Ok(match value {
            0 => Precision::Millennium,
            1 => Precision::Century,
            2 => Precision::Year,
            3 => Precision::Month,
            4 => Precision::Day,
            5 => Precision::Hour,
            6 => Precision::Minute,
            7 => Precision::Second,
            8 => Precision::Millisecond,
            9 => Precision::Microsecond,
            10 => Precision::Nanosecond,
            other => {
                return Err(FudgeError::DateTimeOutOfRange {
                    component: "precision",
                    value: other as i64,
                });
            }
        })
    }
}

// =============================================================================
// DATE
// =============================================================================

/// A calendar date. Month and day may be zero to mean unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    /// Creates a date, validating each component's packed range.
    ///
    /// Calendar validity (days per month, leap years) is not checked; the
    /// format happily carries the 31st of February.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, FudgeError> {
        if !(-MAX_YEAR..=MAX_YEAR).contains(&year) {
            return Err(FudgeError::DateTimeOutOfRange {
                component: "year",
                value: year as i64,
            });
        }
        if month > 12 {
            return Err(FudgeError::DateTimeOutOfRange {
                component: "month",
                value: month as i64,
            });
        }
        if day > 31 {
            return Err(FudgeError::DateTimeOutOfRange {
                component: "day",
                value: day as i64,
            });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Packs into the 4-byte big-endian wire form.
    pub(crate) fn to_wire_bytes(self) -> [u8; 4] {
        let packed = (self.year << 9) | ((self.month as i32) << 5) | self.day as i32;
        packed.to_be_bytes()
    }

    pub(crate) fn from_wire_bytes(bytes: [u8; 4]) -> Result<Self, FudgeError> {
        let packed = i32::from_be_bytes(bytes);
        // arithmetic shift keeps the year's sign
        Self::new(packed >> 9, ((packed >> 5) & 0x0F) as u8, (packed & 0x1F) as u8)
    }
}

// =============================================================================
// TIME
// =============================================================================

/// A time of day with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    seconds: u32,
    nanoseconds: u32,
    precision: Precision,
    timezone_offset: Option<i8>,
}

impl Time {
    /// Creates a time, rounding the components down to `precision` and
    /// validating their ranges. The timezone offset counts 15-minute units
    /// east of UTC.
    pub fn new(
        seconds: u32,
        nanoseconds: u32,
        precision: Precision,
        timezone_offset: Option<i8>,
    ) -> Result<Self, FudgeError> {
        if seconds >= 86_400 {
            return Err(FudgeError::DateTimeOutOfRange {
                component: "seconds",
                value: seconds as i64,
            });
        }
        if nanoseconds >= 1_000_000_000 {
            return Err(FudgeError::DateTimeOutOfRange {
                component: "nanoseconds",
                value: nanoseconds as i64,
            });
        }
        if timezone_offset == Some(NO_TIMEZONE) {
            return Err(FudgeError::DateTimeOutOfRange {
                component: "timezone offset",
                value: NO_TIMEZONE as i64,
            });
        }
        let (seconds, nanoseconds) = round_to_precision(seconds, nanoseconds, precision);
        Ok(Self {
            seconds,
            nanoseconds,
            precision,
            timezone_offset,
        })
    }

    /// Seconds since midnight.
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Nanoseconds within the second.
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Timezone offset in 15-minute units east of UTC, if known.
    pub fn timezone_offset(&self) -> Option<i8> {
        self.timezone_offset
    }

    /// Orders two times on the UTC timeline, treating a missing timezone
    /// as UTC.
    pub fn compare(&self, other: &Time) -> Ordering {
        let utc = |t: &Time| {
            t.seconds as i64 - t.timezone_offset.unwrap_or(0) as i64 * 900
        };
        utc(self)
            .cmp(&utc(other))
            .then(self.nanoseconds.cmp(&other.nanoseconds))
    }

    /// Packs into the 8-byte big-endian wire form.
    pub(crate) fn to_wire_bytes(self) -> [u8; 8] {
        let tz = self.timezone_offset.unwrap_or(NO_TIMEZONE);
        let packed = ((tz as u8 as u64) << 56)
            | ((self.precision as u64) << 52)
            | ((self.seconds as u64) << 32)
            | self.nanoseconds as u64;
        packed.to_be_bytes()
    }

    pub(crate) fn from_wire_bytes(bytes: [u8; 8]) -> Result<Self, FudgeError> {
        let packed = u64::from_be_bytes(bytes);
        let tz = (packed >> 56) as u8 as i8;
        let precision = Precision::from_wire(((packed >> 52) & 0x0F) as u8)?;
        let seconds = ((packed >> 32) & 0x000F_FFFF) as u32;
        let nanoseconds = (packed & 0xFFFF_FFFF) as u32;
        Self::new(
            seconds,
            nanoseconds,
            precision,
            if tz == NO_TIMEZONE { None } else { Some(tz) },
        )
    }
}

/// Rounds a time down to the stated precision.
fn round_to_precision(seconds: u32, nanoseconds: u32, precision: Precision) -> (u32, u32) {
    match precision {
        Precision::Nanosecond => (seconds, nanoseconds),
        Precision::Microsecond => (seconds, nanoseconds / 1_000 * 1_000),
        Precision::Millisecond => (seconds, nanoseconds / 1_000_000 * 1_000_000),
        Precision::Second => (seconds, 0),
        Precision::Minute => (seconds / 60 * 60, 0),
        Precision::Hour => (seconds / 3_600 * 3_600, 0),
        // date-only precisions carry no time of day
        _ => (0, 0),
    }
}

// =============================================================================
// DATETIME
// =============================================================================

/// A combined date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

impl DateTime {
    pub fn new(date: Date, time: Time) -> Self {
        Self { date, time }
    }

    pub(crate) fn to_wire_bytes(self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&self.date.to_wire_bytes());
        bytes[4..].copy_from_slice(&self.time.to_wire_bytes());
        bytes
    }

    pub(crate) fn from_wire_bytes(bytes: [u8; 12]) -> Result<Self, FudgeError> {
        Ok(Self {
            date: Date::from_wire_bytes(bytes[..4].try_into().unwrap())?,
            time: Time::from_wire_bytes(bytes[4..].try_into().unwrap())?,
        })
    }
}

// =============================================================================
// FIELD ACCESSORS
// =============================================================================

impl Field {
    fn wire_payload<const N: usize>(&self, target: u8) -> Result<[u8; N], FudgeError> {
        if self.type_id() != target {
            return Err(FudgeError::InvalidCoercion {
                from: self.type_id(),
                to: target,
            });
        }
        let bytes = self.bytes().ok_or(FudgeError::PayloadMismatch {
            type_id: self.type_id(),
            expected: "bytes",
        })?;
        bytes
            .try_into()
            .map_err(|_| FudgeError::FixedWidthMismatch {
                type_id: target,
                len: bytes.len(),
                expected: N,
            })
    }

    /// Reads the field as a date.
    pub fn as_date(&self) -> Result<Date, FudgeError> {
        Date::from_wire_bytes(self.wire_payload(types::DATE)?)
    }

    /// Reads the field as a time.
    pub fn as_time(&self) -> Result<Time, FudgeError> {
        Time::from_wire_bytes(self.wire_payload(types::TIME)?)
    }

    /// Reads the field as a combined date and time.
    pub fn as_datetime(&self) -> Result<DateTime, FudgeError> {
        DateTime::from_wire_bytes(self.wire_payload(types::DATETIME)?)
    }
}
