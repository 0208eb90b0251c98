//! Time bounds for range-based API resources.

use crate::error::{CoreError, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Optional `(from, to)` bounds for a trade query.
///
/// # Invariant
/// When both bounds are present, `from <= to`. A reversed pair is rejected
/// at construction, never swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradeRange {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl TradeRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<Self> {
        let range = Self { from, to };
        range.validate()?;
        Ok(range)
    }

    /// No bounds: the API returns its most recent trades.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Open-ended range starting at `from`.
    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    /// Whole UTC day: `[date 00:00:00, date+1 00:00:00]`.
    pub fn for_day(date: NaiveDate) -> Self {
        let from = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let to = from + chrono::Duration::days(1);
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    /// Check the ordering invariant.
    pub fn validate(&self) -> Result<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(CoreError::InvalidRange { from, to }),
            _ => Ok(()),
        }
    }
}

/// Whole Unix seconds (UTC) for a timestamp; sub-second precision is dropped.
pub fn unix_epoch(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}
