//! Report session context.
//!
//! A [`ReportContext`] is built once, explicitly, from configuration. It
//! loads and normalizes every asset, precomputes the statistics and chart
//! series, and is read-only afterwards.

use cryptostat_core::{CanonicalRecord, Config, Error, Result};
use cryptostat_ingestion::{load_raw_records, Normalizer};
use cryptostat_stats::{AlignedCloses, StatisticsEngine, StatsSummary};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::series::{
    close_line, monthly_close_distribution, monthly_volume, BoxSummary, DatedValue, FiveNumber,
    Histogram, MonthDistribution, MonthlyVolume, Scatter,
};
use crate::view::AssetView;

/// Normalized table of one asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetTable {
    pub asset: String,
    pub records: Vec<CanonicalRecord>,
}

/// Chart series derived from a single asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSeries {
    pub asset: String,
    pub close_line: Vec<DatedValue>,
    pub monthly_volume: Vec<MonthlyVolume>,
    pub monthly_close: Vec<MonthDistribution>,
}

impl AssetSeries {
    pub fn build(asset: &str, records: &[CanonicalRecord]) -> Self {
        Self {
            asset: asset.to_string(),
            close_line: close_line(records),
            monthly_volume: monthly_volume(records),
            monthly_close: monthly_close_distribution(records),
        }
    }
}

/// Chart series comparing all assets.
#[derive(Debug, Clone, Serialize)]
pub struct CrossAssetSeries {
    pub histogram: Histogram,
    pub boxes: Vec<BoxSummary>,
    /// Closes of the first two assets on shared dates. `None` when fewer
    /// than two assets are loaded or they share no date.
    pub scatter: Option<Scatter>,
}

impl CrossAssetSeries {
    pub fn build(tables: &[(&str, &[CanonicalRecord])], histogram_bins: usize) -> Self {
        let boxes = tables
            .iter()
            .filter_map(|(asset, records)| {
                FiveNumber::of(records.iter().map(|r| r.close)).map(|summary| BoxSummary {
                    asset: asset.to_string(),
                    summary,
                })
            })
            .collect();

        let scatter = match tables {
            [x, y, ..] => match AlignedCloses::join(&[*x, *y]) {
                Ok(aligned) => aligned.points(x.0, y.0).map(|points| Scatter {
                    x_asset: x.0.to_string(),
                    y_asset: y.0.to_string(),
                    points,
                }),
                Err(e) => {
                    warn!(x = x.0, y = y.0, error = %e, "No scatter series");
                    None
                }
            },
            _ => None,
        };

        Self {
            histogram: Histogram::build(tables, histogram_bins),
            boxes,
            scatter,
        }
    }
}

/// Immutable session state: tables, statistics and chart series.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    #[serde(skip)]
    config: Config,
    tables: Vec<AssetTable>,
    series: Vec<AssetSeries>,
    cross: CrossAssetSeries,
    stats: StatsSummary,
}

impl ReportContext {
    /// Load every configured asset and precompute the report.
    ///
    /// Fails on invalid configuration, unreadable or malformed files and
    /// unparseable dates. Statistics that cannot be computed do not fail the
    /// session.
    pub fn initialize(config: &Config) -> Result<Self> {
        config.validate()?;

        let normalizer = Normalizer::new(&config.ingest, &config.locale);
        info!(locale = ?normalizer.month_names().locale(), "Month names resolved");

        let mut tables = Vec::with_capacity(config.assets.len());
        for source in &config.assets {
            let raw = load_raw_records(&source.path, &config.ingest)?;
            let records = normalizer.normalize(&raw, &source.label)?;
            tables.push((source.label.clone(), records));
        }

        Self::from_tables(config.clone(), tables)
    }

    /// Build a context from already normalized tables.
    pub fn from_tables(config: Config, tables: Vec<(String, Vec<CanonicalRecord>)>) -> Result<Self> {
        if tables.is_empty() {
            return Err(Error::config("no asset tables to report on"));
        }
        let mut seen = HashSet::new();
        for (asset, _) in &tables {
            if !seen.insert(asset.as_str()) {
                return Err(Error::config(format!("duplicate asset label: {}", asset)));
            }
        }

        let refs: Vec<(&str, &[CanonicalRecord])> = tables
            .iter()
            .map(|(asset, records)| (asset.as_str(), records.as_slice()))
            .collect();

        let stats = StatisticsEngine::new(config.stats.clone()).run(&refs)?;
        let series = refs
            .iter()
            .map(|(asset, records)| AssetSeries::build(asset, records))
            .collect();
        let cross = CrossAssetSeries::build(&refs, config.report.histogram_bins);

        let tables: Vec<AssetTable> = tables
            .into_iter()
            .map(|(asset, records)| AssetTable { asset, records })
            .collect();

        info!(
            assets = tables.len(),
            rows = tables.iter().map(|t| t.records.len()).sum::<usize>(),
            statistics = stats.results.len(),
            "Report context ready"
        );

        Ok(Self {
            config,
            tables,
            series,
            cross,
            stats,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Asset labels in configuration order.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.asset.as_str())
    }

    pub fn table(&self, asset: &str) -> Option<&AssetTable> {
        self.tables.iter().find(|t| t.asset == asset)
    }

    pub fn series(&self, asset: &str) -> Option<&AssetSeries> {
        self.series.iter().find(|s| s.asset == asset)
    }

    pub fn cross(&self) -> &CrossAssetSeries {
        &self.cross
    }

    pub fn stats(&self) -> &StatsSummary {
        &self.stats
    }

    /// Select one asset.
    pub fn view(&self, asset: &str) -> Result<AssetView<'_>> {
        let (table, series) = match (self.table(asset), self.series(asset)) {
            (Some(table), Some(series)) => (table, series),
            _ => {
                let known: Vec<&str> = self.assets().collect();
                return Err(Error::config(format!(
                    "unknown asset {:?}, expected one of: {}",
                    asset,
                    known.join(", ")
                )));
            }
        };

        Ok(AssetView::new(
            table,
            series,
            &self.stats,
            self.config.report.head_rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptostat_core::RawRecord;
    use cryptostat_stats::TestKind;

    fn table(asset: &str, rows: &[(&str, f64)]) -> (String, Vec<CanonicalRecord>) {
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
        let records = Normalizer::default().normalize(&raw, asset).unwrap();
        (asset.to_string(), records)
    }

    fn sample_tables() -> Vec<(String, Vec<CanonicalRecord>)> {
        vec![
            table(
                "Bitcoin",
                &[("2024-01-01", 1.0), ("2024-01-02", 3.0), ("2024-01-03", 2.0), ("2024-01-04", 5.0)],
            ),
            table(
                "Ethereum",
                &[("2024-01-01", 2.0), ("2024-01-02", 5.0), ("2024-01-03", 4.0), ("2024-01-04", 9.0)],
            ),
        ]
    }

    #[test]
    fn test_from_tables() {
        let ctx = ReportContext::from_tables(Config::default(), sample_tables()).unwrap();
        assert_eq!(ctx.assets().collect::<Vec<_>>(), vec!["Bitcoin", "Ethereum"]);
        assert_eq!(ctx.stats().aligned_dates, 4);
        assert_eq!(ctx.stats().of_kind(TestKind::Pearson).count(), 1);

        let scatter = ctx.cross().scatter.as_ref().unwrap();
        assert_eq!(scatter.x_asset, "Bitcoin");
        assert_eq!(scatter.points[1], (3.0, 5.0));
        assert_eq!(ctx.cross().boxes.len(), 2);
        assert_eq!(ctx.cross().histogram.bin_count(), 50);
    }

    #[test]
    fn test_unknown_asset() {
        let ctx = ReportContext::from_tables(Config::default(), sample_tables()).unwrap();
        assert!(matches!(ctx.view("Dogecoin"), Err(Error::Config(_))));
        assert!(ctx.view("Ethereum").is_ok());
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            ReportContext::from_tables(Config::default(), Vec::new()),
            Err(Error::Config(_))
        ));

        let mut tables = sample_tables();
        tables[1].0 = "Bitcoin".to_string();
        assert!(matches!(
            ReportContext::from_tables(Config::default(), tables),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_single_asset_has_no_scatter() {
        let mut tables = sample_tables();
        tables.truncate(1);
        let ctx = ReportContext::from_tables(Config::default(), tables).unwrap();
        assert!(ctx.cross().scatter.is_none());
        assert!(ctx.stats().of_kind(TestKind::Pearson).next().is_none());
    }
}
