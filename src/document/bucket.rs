//! Day-partitioned document buckets.
//!
//! A bucket is a subdirectory of a module directory named by calendar day in
//! a fixed short format. Buckets for different days never share documents.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Directory name format of a bucket, e.g. `20240301`
pub const BUCKET_DATE_FORMAT: &str = "%Y%m%d";

/// One calendar day's bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateBucket {
    date: NaiveDate,
}

impl DateBucket {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Bucket for the local calendar day containing `instant`
    pub fn for_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::new(instant.with_timezone(&Local).date_naive())
    }

    /// Bucket for the local day containing `millis` since the Unix epoch.
    ///
    /// Returns `None` if the value is outside chrono's representable range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|utc| Self::for_instant(&utc))
    }

    pub fn today() -> Self {
        Self::for_instant(&Local::now())
    }

    /// Parses a bucket directory name. Anything not in the bucket format is `None`.
    pub fn parse(name: &str) -> Option<Self> {
        if name.len() != 8 || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(name, BUCKET_DATE_FORMAT)
            .ok()
            .map(Self::new)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Directory name of this bucket
    pub fn name(&self) -> String {
        self.date.format(BUCKET_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_format() {
        let bucket = DateBucket::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(bucket.name(), "20240301");
        assert_eq!(bucket.to_string(), "20240301");
    }

    #[test]
    fn test_parse() {
        let bucket = DateBucket::parse("20240302").unwrap();
        assert_eq!(bucket.date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        assert!(DateBucket::parse("2024-03-02").is_none());
        assert!(DateBucket::parse("20241399").is_none());
        assert!(DateBucket::parse("+2024030").is_none());
        assert!(DateBucket::parse("notes").is_none());
    }

    #[test]
    fn test_epoch_millis_uses_local_day() {
        let millis = 1_709_294_400_000; // 2024-03-01T12:00:00Z
        let expected = DateTime::from_timestamp_millis(millis)
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(DateBucket::from_epoch_millis(millis).unwrap().date(), expected);
        assert!(DateBucket::from_epoch_millis(i64::MAX).is_none());
    }
}
