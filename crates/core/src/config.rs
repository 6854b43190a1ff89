//! Configuration structures for the cryptostat report.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for a report session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source file per asset.
    pub assets: Vec<AssetSource>,
    /// CSV loading configuration.
    pub ingest: IngestConfig,
    /// Month name localization.
    pub locale: LocaleConfig,
    /// Statistical test configuration.
    pub stats: StatsConfig,
    /// Chart series configuration.
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: vec![
                AssetSource::new("Bitcoin", "Bitcoin.csv"),
                AssetSource::new("Ethereum", "Ethereum.csv"),
                AssetSource::new("Tether", "Tether.csv"),
            ],
            ingest: IngestConfig::default(),
            locale: LocaleConfig::default(),
            stats: StatsConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Check value ranges and cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.assets.len() < 2 {
            return Err(Error::config(format!(
                "at least 2 assets are required for comparison, got {}",
                self.assets.len()
            )));
        }
        for (i, asset) in self.assets.iter().enumerate() {
            if asset.label.trim().is_empty() {
                return Err(Error::config(format!("asset #{} has an empty label", i + 1)));
            }
            if self.assets[..i].iter().any(|a| a.label == asset.label) {
                return Err(Error::config(format!("duplicate asset label '{}'", asset.label)));
            }
        }
        if self.ingest.date_formats.is_empty() {
            return Err(Error::config("ingest.date_formats must not be empty"));
        }
        if !(self.stats.alpha > 0.0 && self.stats.alpha < 1.0) {
            return Err(Error::config(format!(
                "stats.alpha must be in (0, 1), got {}",
                self.stats.alpha
            )));
        }
        if self.report.histogram_bins == 0 {
            return Err(Error::config("report.histogram_bins must be positive"));
        }
        Ok(())
    }

    /// Look up an asset source by label.
    pub fn asset(&self, label: &str) -> Option<&AssetSource> {
        self.assets.iter().find(|a| a.label == label)
    }
}

/// One asset and the file holding its history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSource {
    /// Display label (e.g., "Bitcoin").
    pub label: String,
    /// Path to the semicolon-delimited source file.
    pub path: PathBuf,
}

impl AssetSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// CSV loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Field delimiter.
    pub delimiter: char,
    /// Whether the first line is a header row (names are ignored).
    pub has_headers: bool,
    /// Accepted date formats (chrono strftime syntax), tried in order per row.
    ///
    /// RFC 3339 timestamps are always accepted in addition to these.
    pub date_formats: Vec<String>,
    /// Prefer day-first readings for ambiguous numeric dates (e.g., 03/04/2024).
    ///
    /// The other reading is still tried when the preferred one is impossible.
    pub day_first: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            has_headers: true,
            date_formats: vec![
                "%Y-%m-%dT%H:%M:%S%.fZ".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%Y-%m-%d".to_string(),
                "%Y/%m/%d".to_string(),
                "%m/%d/%Y %H:%M:%S".to_string(),
                "%m/%d/%Y".to_string(),
                "%m-%d-%Y".to_string(),
                "%d.%m.%Y".to_string(),
                "%d %B %Y".to_string(),
                "%B %d, %Y".to_string(),
                "%b %d, %Y".to_string(),
                "%B %d %Y".to_string(),
                "%b %d %Y".to_string(),
            ],
            day_first: false,
        }
    }
}

/// Locale used for month names, with explicit fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locale tried first (e.g., "es_ES").
    pub preferred: String,
    /// Locale used when the preferred one is unknown.
    pub fallback: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            preferred: "es_ES".to_string(),
            fallback: "en_US".to_string(),
        }
    }
}

/// How month trends of two assets are paired for the association test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendAlignment {
    /// One label per asset and year-month, paired on month name.
    Month,
    /// Every row of each asset, paired on month name.
    Row,
}

/// Statistical test configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Significance level used for interpretation text.
    pub alpha: f64,
    /// Apply Yates' continuity correction to 2x2 tables.
    pub yates_correction: bool,
    /// Trend pairing granularity for the Chi-squared test.
    pub trend_alignment: TrendAlignment,
    /// Sample size above which Shapiro-Wilk p-values are flagged as approximate.
    pub shapiro_max_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            yates_correction: true,
            trend_alignment: TrendAlignment::Month,
            shapiro_max_n: 5000,
        }
    }
}

/// Chart series configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of bins in the cross-asset close histogram.
    pub histogram_bins: usize,
    /// Rows shown in the per-asset preview.
    pub head_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 50,
            head_rows: 5,
        }
    }
}
