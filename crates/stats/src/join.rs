//! Alignment of asset series before pairwise tests.
//!
//! Close prices are inner-joined on date; trend labels are paired on month
//! name and counted straight into a 2x2 contingency table.

use chrono::NaiveDate;
use cryptostat_core::config::TrendAlignment;
use cryptostat_core::{CanonicalRecord, Error, MonthPeriod, MonthTrend, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::chi_square::ContingencyTable;

/// Close prices of several assets on the dates they all share.
#[derive(Debug, Clone, Serialize)]
pub struct AlignedCloses {
    labels: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl AlignedCloses {
    /// Inner-join the given series on `date`.
    ///
    /// A date repeated within one series keeps its first occurrence, so the
    /// result is never longer than the shortest input. Dates come out in
    /// ascending order. An empty intersection is an error.
    pub fn join(series: &[(&str, &[CanonicalRecord])]) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::insufficient_data("no series to join"));
        }

        let by_date: Vec<BTreeMap<NaiveDate, f64>> = series
            .iter()
            .map(|(_, records)| {
                let mut map = BTreeMap::new();
                for r in records.iter() {
                    map.entry(r.date).or_insert(r.close);
                }
                map
            })
            .collect();

        let dates: Vec<NaiveDate> = by_date[0]
            .keys()
            .filter(|date| by_date[1..].iter().all(|m| m.contains_key(*date)))
            .copied()
            .collect();

        if dates.is_empty() {
            let names: Vec<&str> = series.iter().map(|(label, _)| *label).collect();
            return Err(Error::insufficient_data(format!(
                "no dates shared by {}",
                names.join(", ")
            )));
        }

        let columns = by_date
            .iter()
            .map(|m| dates.iter().map(|d| m[d]).collect())
            .collect();

        Ok(Self {
            labels: series.iter().map(|(label, _)| label.to_string()).collect(),
            dates,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Aligned closes of one asset.
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.columns[i].as_slice())
    }

    /// `(x, y)` points of two assets, for scatter plots.
    pub fn points(&self, x: &str, y: &str) -> Option<Vec<(f64, f64)>> {
        let xs = self.column(x)?;
        let ys = self.column(y)?;
        Some(xs.iter().copied().zip(ys.iter().copied()).collect())
    }
}

/// Trend label counts per month name, `[Increased, Decreased]`.
fn trend_counts(records: &[CanonicalRecord], alignment: TrendAlignment) -> HashMap<&str, [u64; 2]> {
    let mut counts: HashMap<&str, [u64; 2]> = HashMap::new();

    match alignment {
        TrendAlignment::Row => {
            for r in records {
                counts.entry(r.month_name.as_str()).or_default()[r.month_trend.index()] += 1;
            }
        }
        TrendAlignment::Month => {
            let mut months: BTreeMap<MonthPeriod, (&str, MonthTrend)> = BTreeMap::new();
            for r in records {
                months
                    .entry(r.month_period())
                    .or_insert((r.month_name.as_str(), r.month_trend));
            }
            for (name, trend) in months.into_values() {
                counts.entry(name).or_default()[trend.index()] += 1;
            }
        }
    }

    counts
}

/// Cross-tabulate two assets' trend labels paired on month name.
///
/// Rows are the first asset's labels, columns the second's. Every label of
/// `a` for a month name is paired with every label of `b` for that name.
pub fn trend_table(
    a: &[CanonicalRecord],
    b: &[CanonicalRecord],
    alignment: TrendAlignment,
) -> ContingencyTable {
    let counts_a = trend_counts(a, alignment);
    let counts_b = trend_counts(b, alignment);

    let mut table = [[0u64; 2]; 2];
    for (name, ca) in &counts_a {
        if let Some(cb) = counts_b.get(name) {
            for i in 0..2 {
                for j in 0..2 {
                    table[i][j] += ca[i] * cb[j];
                }
            }
        }
    }

    ContingencyTable::new(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptostat_ingestion::Normalizer;
    use cryptostat_core::RawRecord;

    fn series(asset: &str, rows: &[(&str, f64)]) -> Vec<CanonicalRecord> {
        let raw: Vec<RawRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, (date, close))| RawRecord {
                id: i.to_string(),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
                market_cap: 1.0,
                date_string: date.to_string(),
            })
            .collect();
        Normalizer::default().normalize(&raw, asset).unwrap()
    }

    #[test]
    fn test_join_keeps_shared_dates() {
        let btc = series("Bitcoin", &[("2024-01-01", 1.0), ("2024-01-02", 2.0), ("2024-01-03", 3.0)]);
        let eth = series("Ethereum", &[("2024-01-03", 30.0), ("2024-01-02", 20.0), ("2024-01-05", 50.0)]);

        let aligned = AlignedCloses::join(&[("Bitcoin", &btc[..]), ("Ethereum", &eth[..])]).unwrap();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.column("Bitcoin").unwrap(), &[2.0, 3.0]);
        assert_eq!(aligned.column("Ethereum").unwrap(), &[20.0, 30.0]);
        assert!(aligned.column("Tether").is_none());
        assert_eq!(aligned.points("Bitcoin", "Ethereum").unwrap(), vec![(2.0, 20.0), (3.0, 30.0)]);
    }

    #[test]
    fn test_join_invariant() {
        let btc = series("Bitcoin", &[("2024-01-01", 1.0), ("2024-01-01", 9.0), ("2024-01-02", 2.0)]);
        let eth = series("Ethereum", &[("2024-01-01", 10.0), ("2024-01-02", 20.0), ("2024-01-02", 99.0)]);
        let usdt = series("Tether", &[("2024-01-02", 1.0), ("2024-01-01", 1.0)]);

        let aligned =
            AlignedCloses::join(&[("Bitcoin", &btc[..]), ("Ethereum", &eth[..]), ("Tether", &usdt[..])]).unwrap();
        let shortest = btc.len().min(eth.len()).min(usdt.len());
        assert!(aligned.len() <= shortest);
        for date in aligned.dates() {
            assert!(btc.iter().any(|r| r.date == *date));
            assert!(eth.iter().any(|r| r.date == *date));
            assert!(usdt.iter().any(|r| r.date == *date));
        }
        // First occurrence wins on duplicated dates.
        assert_eq!(aligned.column("Bitcoin").unwrap(), &[1.0, 2.0]);
        assert_eq!(aligned.column("Ethereum").unwrap(), &[10.0, 20.0]);
    }

    #[test]
    fn test_join_empty_intersection() {
        let btc = series("Bitcoin", &[("2024-01-01", 1.0)]);
        let eth = series("Ethereum", &[("2024-02-01", 1.0)]);
        let result = AlignedCloses::join(&[("Bitcoin", &btc[..]), ("Ethereum", &eth[..])]);
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_trend_table_month_level() {
        // Bitcoin: Jan up, Feb down. Ethereum: Jan up, Feb up.
        let btc = series(
            "Bitcoin",
            &[("2024-01-01", 1.0), ("2024-01-31", 2.0), ("2024-02-01", 2.0), ("2024-02-29", 1.0)],
        );
        let eth = series(
            "Ethereum",
            &[("2024-01-01", 1.0), ("2024-01-31", 2.0), ("2024-02-01", 1.0), ("2024-02-29", 2.0)],
        );

        let table = trend_table(&btc, &eth, TrendAlignment::Month);
        assert_eq!(table.counts(), [[1, 0], [1, 0]]);
    }

    #[test]
    fn test_trend_table_row_level() {
        let btc = series(
            "Bitcoin",
            &[("2024-01-01", 1.0), ("2024-01-15", 3.0), ("2024-01-31", 2.0)],
        );
        let eth = series("Ethereum", &[("2024-01-01", 5.0), ("2024-01-31", 4.0)]);

        // 3 Increased rows x 2 Decreased rows for "enero".
        let table = trend_table(&btc, &eth, TrendAlignment::Row);
        assert_eq!(table.counts(), [[0, 6], [0, 0]]);
    }

    #[test]
    fn test_trend_table_pairs_same_month_name_across_years() {
        let btc = series(
            "Bitcoin",
            &[("2023-01-01", 1.0), ("2023-01-31", 2.0), ("2024-01-01", 2.0), ("2024-01-31", 1.0)],
        );
        let eth = series("Ethereum", &[("2024-01-01", 1.0), ("2024-01-31", 2.0)]);

        let table = trend_table(&btc, &eth, TrendAlignment::Month);
        assert_eq!(table.counts(), [[1, 0], [1, 0]]);
        assert_eq!(table.total(), 2);
    }
}
