//! Calendar month targeting for aggregate release notes.
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::{fmt, str::FromStr};

use crate::{NotesaurusError, Result};

/// A calendar month in `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetMonth {
    year: i32,
    month: u32,
}

impl TargetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(NotesaurusError::invalid_config(format!(
                "invalid target month: {year}-{month}"
            )));
        }

        Ok(Self { year, month })
    }

    /// Parses exactly `YYYY-MM`.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || {
            NotesaurusError::invalid_config(format!(
                "target month must look like YYYY-MM, got: \"{value}\""
            ))
        };

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;

        if year.len() != 4
            || month.len() != 2
            || !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;

        Self::new(year, month)
    }

    /// The calendar month immediately before `date`.
    pub fn preceding(date: NaiveDate) -> Self {
        if date.month() == 1 {
            Self {
                year: date.year() - 1,
                month: 12,
            }
        } else {
            Self {
                year: date.year(),
                month: date.month() - 1,
            }
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Midnight UTC at the start of the month.
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.first_day().and_time(Default::default()))
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        timestamp.year() == self.year && timestamp.month() == self.month
    }
}

impl fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TargetMonth {
    type Err = NotesaurusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parses_and_displays() {
        let month = TargetMonth::parse("2026-01").unwrap();
        assert_eq!(month.year(), 2026);
        assert_eq!(month.month(), 1);
        assert_eq!(month.to_string(), "2026-01");
    }

    #[test]
    fn rejects_malformed_months() {
        for bad in ["", "2026", "2026-1", "2026-13", "2026-00", "26-01", "2026/01", "abcd-ef"]
        {
            assert!(TargetMonth::parse(bad).is_err(), "accepted: {bad:?}");
        }
    }

    #[test]
    fn release_belongs_only_to_its_own_month() {
        let published = ts("2026-01-15T10:00:00Z");

        assert!(TargetMonth::parse("2026-01").unwrap().contains(&published));
        assert!(!TargetMonth::parse("2025-12").unwrap().contains(&published));
        assert!(!TargetMonth::parse("2026-02").unwrap().contains(&published));
    }

    #[test]
    fn month_boundaries_are_inclusive_of_first_and_last_instant() {
        let month = TargetMonth::parse("2026-01").unwrap();
        assert!(month.contains(&ts("2026-01-01T00:00:00Z")));
        assert!(month.contains(&ts("2026-01-31T23:59:59Z")));
        assert!(!month.contains(&ts("2026-02-01T00:00:00Z")));
        assert_eq!(month.start(), ts("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn default_month_is_the_one_before_invocation() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        assert_eq!(TargetMonth::preceding(today).to_string(), "2026-01");
    }

    #[test]
    fn default_month_rolls_over_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert_eq!(TargetMonth::preceding(today).to_string(), "2025-12");
    }
}
