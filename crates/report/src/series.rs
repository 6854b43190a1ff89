//! Chart-ready data series.
//!
//! Everything here is plain data for a presentation layer to draw: close
//! lines, monthly volume bars, monthly close boxes, a shared close
//! histogram and scatter points.

use chrono::NaiveDate;
use cryptostat_core::{CanonicalRecord, MonthPeriod};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;

/// One point of a close-over-time line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Close price in date order.
pub fn close_line(records: &[CanonicalRecord]) -> Vec<DatedValue> {
    let mut line: Vec<DatedValue> = records
        .iter()
        .map(|r| DatedValue {
            date: r.date,
            value: r.close,
        })
        .collect();
    // Stable sort keeps input order for repeated dates.
    line.sort_by_key(|p| p.date);
    line
}

/// Total traded volume of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVolume {
    /// "YYYY-MM".
    pub period: String,
    pub volume: f64,
}

/// Volume summed per (year, month), in calendar order.
pub fn monthly_volume(records: &[CanonicalRecord]) -> Vec<MonthlyVolume> {
    let mut sums: BTreeMap<MonthPeriod, f64> = BTreeMap::new();
    for r in records {
        *sums.entry(r.month_period()).or_insert(0.0) += r.volume;
    }

    sums.into_iter()
        .map(|(period, volume)| MonthlyVolume {
            period: period.to_string(),
            volume,
        })
        .collect()
}

/// Min, quartiles and max of a sample.
///
/// Quartiles interpolate linearly between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

impl FiveNumber {
    /// Summarize a sample, `None` when it is empty.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<OrderedFloat<f64>> = values.into_iter().map(OrderedFloat).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort();

        let sorted: Vec<f64> = sorted.into_iter().map(|v| v.0).collect();
        let n = sorted.len();
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[n - 1],
            count: n,
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Close distribution of one month name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDistribution {
    pub month_name: String,
    pub summary: FiveNumber,
}

/// Close summaries grouped by month name, in first-seen order.
///
/// Months of different years that share a name fall into one group.
pub fn monthly_close_distribution(records: &[CanonicalRecord]) -> Vec<MonthDistribution> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for r in records {
        let name = r.month_name.as_str();
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(r.close);
    }

    order
        .into_iter()
        .filter_map(|name| {
            let values = groups.remove(name)?;
            FiveNumber::of(values).map(|summary| MonthDistribution {
                month_name: name.to_string(),
                summary,
            })
        })
        .collect()
}

/// Close summary of one asset, for side-by-side box plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub asset: String,
    pub summary: FiveNumber,
}

/// Per-asset bin counts of a [`Histogram`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub asset: String,
    pub counts: Vec<u64>,
}

/// Close histogram with bins shared by all assets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges. The last bin includes its upper edge.
    pub edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

impl Histogram {
    /// Bin every asset's closes into `bins` equal-width bins spanning the
    /// overall close range.
    ///
    /// A zero-width range is widened to `[v - 0.5, v + 0.5]`. With no
    /// values at all the histogram has no edges.
    pub fn build(tables: &[(&str, &[CanonicalRecord])], bins: usize) -> Self {
        let closes = tables.iter().flat_map(|(_, records)| records.iter().map(|r| r.close));
        let bounds = closes.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

        let (lo, hi) = match bounds {
            Some((lo, hi)) if bins > 0 => {
                if hi > lo {
                    (lo, hi)
                } else {
                    (lo - 0.5, hi + 0.5)
                }
            }
            _ => {
                return Self {
                    edges: Vec::new(),
                    series: tables
                        .iter()
                        .map(|(asset, _)| HistogramSeries {
                            asset: asset.to_string(),
                            counts: Vec::new(),
                        })
                        .collect(),
                }
            }
        };

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let series = tables
            .iter()
            .map(|(asset, records)| {
                let mut counts = vec![0u64; bins];
                for r in records.iter() {
                    let idx = (((r.close - lo) / width).floor() as usize).min(bins - 1);
                    counts[idx] += 1;
                }
                HistogramSeries {
                    asset: asset.to_string(),
                    counts,
                }
            })
            .collect();

        Self { edges, series }
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Counts of one asset.
    pub fn counts(&self, asset: &str) -> Option<&[u64]> {
        self.series
            .iter()
            .find(|s| s.asset == asset)
            .map(|s| s.counts.as_slice())
    }
}

/// Date-aligned closes of two assets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x_asset: String,
    pub y_asset: String,
    pub points: Vec<(f64, f64)>,
}
