//! Date-range validation and defaulting.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::Serialize;

use crate::errors::{RangeViolation, ValidationError};
use crate::params::{END_DATE, START_DATE};

/// Minimum age, in days, of the last day in a range.
pub const MIN_STALENESS_DAYS: i64 = 7;

/// Maximum age, in days, of the first day in a range.
pub const MAX_LOOKBACK_DAYS: i64 = 730;

/// Length of the window used when the caller supplies no dates.
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;

/// A validated, inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Rules for the date window a caller may query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangePolicy {
    pub min_staleness_days: i64,
    pub max_lookback_days: i64,
    pub default_window_months: u32,
}

impl Default for DateRangePolicy {
    fn default() -> Self {
        Self {
            min_staleness_days: MIN_STALENESS_DAYS,
            max_lookback_days: MAX_LOOKBACK_DAYS,
            default_window_months: DEFAULT_WINDOW_MONTHS,
        }
    }
}

impl DateRangePolicy {
    /// Validate the caller's dates, or default both when neither is given.
    ///
    /// Blank strings count as absent. `now` is the current calendar date; this
    /// function never reads the clock.
    pub fn resolve(
        &self,
        raw_start: Option<&str>,
        raw_end: Option<&str>,
        now: NaiveDate,
    ) -> Result<DateRange, ValidationError> {
        let raw_start = raw_start.map(str::trim).filter(|s| !s.is_empty());
        let raw_end = raw_end.map(str::trim).filter(|s| !s.is_empty());

        let (start, end) = match (raw_start, raw_end) {
            (None, None) => (self.default_start(now), self.latest_end(now)),
            (Some(start), Some(end)) => (parse_date(START_DATE, start)?, parse_date(END_DATE, end)?),
            (None, Some(_)) => return Err(ValidationError::MissingParameter(START_DATE.to_string())),
            (Some(_), None) => return Err(ValidationError::MissingParameter(END_DATE.to_string())),
        };

        self.check(start, end, now)
    }

    /// Latest end date the policy accepts on `now`.
    pub fn latest_end(&self, now: NaiveDate) -> NaiveDate {
        now.checked_sub_signed(Duration::days(self.min_staleness_days))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Earliest start date the policy accepts on `now`.
    pub fn earliest_start(&self, now: NaiveDate) -> NaiveDate {
        now.checked_sub_signed(Duration::days(self.max_lookback_days))
            .unwrap_or(NaiveDate::MIN)
    }

    fn default_start(&self, now: NaiveDate) -> NaiveDate {
        // Month arithmetic clamps to the last day of the target month.
        now.checked_sub_months(Months::new(self.default_window_months))
            .unwrap_or(NaiveDate::MIN)
    }

    fn check(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        now: NaiveDate,
    ) -> Result<DateRange, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange(RangeViolation::StartAfterEnd));
        }
        if end > self.latest_end(now) {
            return Err(ValidationError::InvalidRange(RangeViolation::EndTooRecent));
        }
        if start < self.earliest_start(now) {
            return Err(ValidationError::InvalidRange(RangeViolation::StartTooFarBack));
        }
        Ok(DateRange { start, end })
    }
}

/// Parse a calendar date, accepting `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(param: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    Err(ValidationError::MissingParameter(format!(
        "{} (expected YYYY-MM-DD, got '{}')",
        param, raw
    )))
}
