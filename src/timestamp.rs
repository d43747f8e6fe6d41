//! Entry modification times.
//!
//! ZIP headers store modification times in the MS-DOS format: local date and
//! time fields with 2-second resolution and a year range of 1980..=2107. The
//! [`Timestamp`] type keeps times as Unix seconds and converts at the container
//! boundary. DOS fields carry no time zone; this crate reads and writes them
//! as UTC so a round trip is lossless apart from the 2-second truncation.
//!
//! # Example
//!
//! ```rust
//! use zipdir::Timestamp;
//!
//! let ts = Timestamp::from_unix_secs(1_700_000_001);
//! let dos = ts.to_dos();
//! assert_eq!(Timestamp::from_dos(&dos).as_unix_secs(), 1_700_000_000);
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use filetime::FileTime;

const SECS_PER_DAY: i64 = 86_400;

/// A modification time with one-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
}

impl Timestamp {
    /// Creates a timestamp from Unix seconds (since January 1, 1970 UTC).
    #[inline]
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self { secs }
    }

    /// Returns the current time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Creates a timestamp from a `SystemTime`, truncating sub-second parts.
    pub fn from_system_time(time: SystemTime) -> Self {
        let secs = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Self { secs }
    }

    /// Reads the modification time from filesystem metadata.
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        let ft = FileTime::from_last_modification_time(metadata);
        Self::from_unix_secs(ft.unix_seconds())
    }

    /// Returns seconds since the Unix epoch.
    #[inline]
    pub const fn as_unix_secs(&self) -> i64 {
        self.secs
    }

    /// Converts to a `SystemTime`.
    pub fn as_system_time(&self) -> SystemTime {
        if self.secs >= 0 {
            UNIX_EPOCH + Duration::from_secs(self.secs as u64)
        } else {
            UNIX_EPOCH - Duration::from_secs(self.secs.unsigned_abs())
        }
    }

    /// Converts to a `FileTime` for setting file times on disk.
    pub fn as_file_time(&self) -> FileTime {
        FileTime::from_unix_time(self.secs, 0)
    }

    /// Converts to the DOS date/time stored in ZIP headers.
    ///
    /// Times outside the representable range clamp to 1980-01-01 00:00:00 or
    /// 2107-12-31 23:59:58.
    pub fn to_dos(&self) -> zip::DateTime {
        let days = self.secs.div_euclid(SECS_PER_DAY);
        let rem = self.secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        if year < 1980 {
            return zip::DateTime::default();
        }
        if year > 2107 {
            return zip::DateTime::from_date_and_time(2107, 12, 31, 23, 59, 58)
                .unwrap_or_default();
        }

        zip::DateTime::from_date_and_time(
            year as u16,
            month as u8,
            day as u8,
            (rem / 3600) as u8,
            ((rem % 3600) / 60) as u8,
            (rem % 60) as u8,
        )
        .unwrap_or_default()
    }

    /// Converts a DOS date/time read from a ZIP header.
    pub fn from_dos(dt: &zip::DateTime) -> Self {
        let days = days_from_civil(dt.year() as i64, dt.month() as i64, dt.day() as i64);
        let secs = days * SECS_PER_DAY
            + dt.hour() as i64 * 3600
            + dt.minute() as i64 * 60
            + dt.second() as i64;
        Self { secs }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        ts.as_system_time()
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: (year, month, day).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}
