//! Normalization of raw asset rows into canonical records.
//!
//! Parses dates, attaches localized month names and broadcasts a per-month
//! trend label (net close change between the chronologically first and last
//! row of each year-month) to every row of that month.

use chrono::NaiveDate;
use cryptostat_core::config::{IngestConfig, LocaleConfig};
use cryptostat_core::{CanonicalRecord, Error, MonthPeriod, MonthTrend, RawRecord, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::dates::DateParser;
use crate::locale::MonthNames;

/// First and last observation of a month, ordered by (date, input position).
#[derive(Debug, Clone, Copy)]
struct MonthBounds {
    first: (NaiveDate, usize, f64),
    last: (NaiveDate, usize, f64),
}

impl MonthBounds {
    fn new(date: NaiveDate, pos: usize, close: f64) -> Self {
        Self {
            first: (date, pos, close),
            last: (date, pos, close),
        }
    }

    fn add(&mut self, date: NaiveDate, pos: usize, close: f64) {
        if (date, pos) < (self.first.0, self.first.1) {
            self.first = (date, pos, close);
        }
        if (date, pos) > (self.last.0, self.last.1) {
            self.last = (date, pos, close);
        }
    }

    fn trend(&self) -> MonthTrend {
        MonthTrend::from_delta(self.last.2 - self.first.2)
    }
}

/// Compute the trend label of every month present in `observations`.
///
/// Observations are `(date, close)` in any order; position in the iterator
/// breaks ties between rows sharing a date.
pub fn month_trends<I>(observations: I) -> BTreeMap<MonthPeriod, MonthTrend>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut bounds: BTreeMap<MonthPeriod, MonthBounds> = BTreeMap::new();

    for (pos, (date, close)) in observations.into_iter().enumerate() {
        bounds
            .entry(MonthPeriod::of(date))
            .and_modify(|b| b.add(date, pos, close))
            .or_insert_with(|| MonthBounds::new(date, pos, close));
    }

    bounds.into_iter().map(|(period, b)| (period, b.trend())).collect()
}

/// Turns raw per-asset rows into canonical records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    dates: DateParser,
    months: MonthNames,
}

impl Normalizer {
    /// Create a normalizer from ingest and locale configuration.
    pub fn new(ingest: &IngestConfig, locale: &LocaleConfig) -> Self {
        Self {
            dates: DateParser::new(ingest),
            months: MonthNames::resolve(locale),
        }
    }

    pub fn month_names(&self) -> &MonthNames {
        &self.months
    }

    /// Normalize one asset's rows.
    ///
    /// Rows with a missing field are dropped. Any unparseable date aborts the
    /// whole asset. Output keeps input order.
    pub fn normalize(&self, raw: &[RawRecord], asset: &str) -> Result<Vec<CanonicalRecord>> {
        let complete: Vec<&RawRecord> = raw.iter().filter(|r| is_complete(r)).collect();
        let dropped = raw.len() - complete.len();
        if dropped > 0 {
            debug!(asset, dropped, "Dropped incomplete rows before normalization");
        }

        let dates = complete
            .iter()
            .map(|r| self.dates.parse(&r.date_string))
            .collect::<Result<Vec<NaiveDate>>>()
            .map_err(|e| match e {
                Error::DateParse(msg) => Error::date_parse(format!("asset {}: {}", asset, msg)),
                other => other,
            })?;

        let trends: HashMap<MonthPeriod, MonthTrend> = month_trends(
            dates.iter().copied().zip(complete.iter().map(|r| r.close)),
        )
        .into_iter()
        .collect();

        let records: Vec<CanonicalRecord> = complete
            .into_iter()
            .zip(dates)
            .map(|(r, date)| CanonicalRecord {
                id: r.id.clone(),
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
                market_cap: r.market_cap,
                date_string: r.date_string.clone(),
                date,
                month_name: self.months.name_of(date).to_string(),
                month_trend: trends[&MonthPeriod::of(date)],
                asset: asset.to_string(),
            })
            .collect();

        let increased = trends.values().filter(|t| **t == MonthTrend::Increased).count();
        info!(
            asset,
            rows = records.len(),
            months = trends.len(),
            increased_months = increased,
            "Normalized asset"
        );

        Ok(records)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&IngestConfig::default(), &LocaleConfig::default())
    }
}

fn is_complete(r: &RawRecord) -> bool {
    !r.id.trim().is_empty()
        && !r.date_string.trim().is_empty()
        && [r.open, r.high, r.low, r.close, r.volume, r.market_cap]
            .iter()
            .all(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: usize, date: &str, close: f64) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
            market_cap: close * 100.0,
            date_string: date.to_string(),
        }
    }

    fn trend_of(records: &[CanonicalRecord], month: u32) -> Vec<MonthTrend> {
        records
            .iter()
            .filter(|r| r.month_period().month == month)
            .map(|r| r.month_trend)
            .collect()
    }

    #[test]
    fn test_decreasing_month() {
        let rows = vec![
            raw(1, "2024-01-01", 10.0),
            raw(2, "2024-01-02", 12.0),
            raw(3, "2024-01-03", 9.0),
        ];
        let records = Normalizer::default().normalize(&rows, "Bitcoin").unwrap();
        assert_eq!(trend_of(&records, 1), vec![MonthTrend::Decreased; 3]);
    }

    #[test]
    fn test_increasing_month() {
        let rows = vec![
            raw(1, "2024-01-01", 10.0),
            raw(2, "2024-01-02", 9.0),
            raw(3, "2024-01-03", 15.0),
        ];
        let records = Normalizer::default().normalize(&rows, "Bitcoin").unwrap();
        assert_eq!(trend_of(&records, 1), vec![MonthTrend::Increased; 3]);
    }

    #[test]
    fn test_unchanged_month_is_decreased() {
        let rows = vec![raw(1, "2024-02-01", 10.0), raw(2, "2024-02-29", 10.0)];
        let records = Normalizer::default().normalize(&rows, "Tether").unwrap();
        assert_eq!(trend_of(&records, 2), vec![MonthTrend::Decreased; 2]);
    }

    #[test]
    fn test_trend_uses_chronological_order() {
        // Input is newest-first; chronologically closes go 10 -> 15.
        let rows = vec![
            raw(3, "2024-03-31", 15.0),
            raw(2, "2024-03-15", 9.0),
            raw(1, "2024-03-01", 10.0),
        ];
        let records = Normalizer::default().normalize(&rows, "Bitcoin").unwrap();
        assert_eq!(trend_of(&records, 3), vec![MonthTrend::Increased; 3]);
        // Output keeps input order.
        assert_eq!(records[0].id, "3");
        assert_eq!(records[2].id, "1");
    }

    #[test]
    fn test_trend_is_broadcast_per_month() {
        let rows = vec![
            raw(1, "2024-01-01", 10.0),
            raw(2, "2024-01-31", 20.0),
            raw(3, "2024-02-01", 20.0),
            raw(4, "2024-02-15", 25.0),
            raw(5, "2024-02-28", 5.0),
            raw(6, "2025-01-10", 3.0),
            raw(7, "2025-01-20", 1.0),
        ];
        let records = Normalizer::default().normalize(&rows, "Ethereum").unwrap();

        let mut seen: HashMap<MonthPeriod, MonthTrend> = HashMap::new();
        for r in &records {
            let prev = seen.entry(r.month_period()).or_insert(r.month_trend);
            assert_eq!(*prev, r.month_trend);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[&MonthPeriod { year: 2024, month: 1 }], MonthTrend::Increased);
        assert_eq!(seen[&MonthPeriod { year: 2024, month: 2 }], MonthTrend::Decreased);
        assert_eq!(seen[&MonthPeriod { year: 2025, month: 1 }], MonthTrend::Decreased);
    }

    #[test]
    fn test_month_names_and_asset_label() {
        let rows = vec![raw(1, "2024-01-05T00:00:00.000Z", 10.0)];
        let records = Normalizer::default().normalize(&rows, "Bitcoin").unwrap();
        assert_eq!(records[0].month_name, "enero");
        assert_eq!(records[0].asset, "Bitcoin");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let mut bad = raw(2, "2024-01-02", 11.0);
        bad.volume = f64::NAN;
        let rows = vec![raw(1, "2024-01-01", 10.0), bad, raw(3, "", 12.0)];
        let records = Normalizer::default().normalize(&rows, "Bitcoin").unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.len() <= rows.len());
    }

    #[test]
    fn test_bad_date_aborts_asset() {
        let rows = vec![raw(1, "2024-01-01", 10.0), raw(2, "not a date", 11.0)];
        let result = Normalizer::default().normalize(&rows, "Bitcoin");
        assert!(matches!(result, Err(Error::DateParse(ref msg)) if msg.contains("Bitcoin")));
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![
            raw(1, "2024-01-01", 10.0),
            raw(2, "01/15/2024", 12.0),
            raw(3, "2024-02-01 00:00:00", 9.0),
        ];
        let normalizer = Normalizer::default();
        let first = normalizer.normalize(&rows, "Bitcoin").unwrap();
        let second = normalizer.normalize(&rows, "Bitcoin").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_month_trends_empty() {
        assert!(month_trends(std::iter::empty()).is_empty());
    }
}
