//! Core data types for the cryptostat report.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered list of columns every input file must carry.
pub const RAW_FIELDS: [&str; 8] = [
    "id",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "market_cap",
    "date",
];

/// One row of a per-asset source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Source row identifier.
    pub id: String,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Market capitalization.
    pub market_cap: f64,
    /// Date text as found in the file.
    pub date_string: String,
}

/// Direction of a month's net closing price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonthTrend {
    /// Last close of the month strictly above the first close.
    Increased,
    /// Last close at or below the first close.
    Decreased,
}

impl MonthTrend {
    /// Both labels, in contingency table order.
    pub const ALL: [MonthTrend; 2] = [MonthTrend::Increased, MonthTrend::Decreased];

    /// Classify a net change. Zero change counts as Decreased.
    #[inline]
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            MonthTrend::Increased
        } else {
            MonthTrend::Decreased
        }
    }

    /// Row/column index in a 2x2 contingency table.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MonthTrend::Increased => 0,
            MonthTrend::Decreased => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MonthTrend::Increased => "Increased",
            MonthTrend::Decreased => "Decreased",
        }
    }
}

impl fmt::Display for MonthTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (year, month) bucket used as an aggregation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    /// Bucket containing the given date.
    #[inline]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A parsed, schema-normalized row enriched with derived month fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub market_cap: f64,
    pub date_string: String,
    /// Calendar date parsed from `date_string`.
    pub date: NaiveDate,
    /// Localized full month name of `date`.
    pub month_name: String,
    /// Trend of the month this row belongs to.
    pub month_trend: MonthTrend,
    /// Asset this row belongs to (e.g., "Bitcoin").
    pub asset: String,
}

impl CanonicalRecord {
    /// Month bucket of this row.
    #[inline]
    pub fn month_period(&self) -> MonthPeriod {
        MonthPeriod::of(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_tie_is_decreased() {
        assert_eq!(MonthTrend::from_delta(5.0), MonthTrend::Increased);
        assert_eq!(MonthTrend::from_delta(0.0), MonthTrend::Decreased);
        assert_eq!(MonthTrend::from_delta(-1.0), MonthTrend::Decreased);
    }

    #[test]
    fn test_month_period_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let period = MonthPeriod::of(date);
        assert_eq!(period, MonthPeriod { year: 2024, month: 3 });
        assert_eq!(period.to_string(), "2024-03");
    }

    #[test]
    fn test_month_period_ordering() {
        let dec = MonthPeriod { year: 2023, month: 12 };
        let jan = MonthPeriod { year: 2024, month: 1 };
        assert!(dec < jan);
    }
}
