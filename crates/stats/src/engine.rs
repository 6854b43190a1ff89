//! Comparative statistics engine.
//!
//! Precomputes every pairwise correlation, per-asset normality test and
//! pairwise trend association for a set of canonical tables. A statistic
//! whose preconditions fail is reported as not computable; the others are
//! still produced.

use cryptostat_core::config::StatsConfig;
use cryptostat_core::{CanonicalRecord, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::chi_square::{chi_square_independence, ContingencyTable};
use crate::interpret;
use crate::join::{trend_table, AlignedCloses};
use crate::pearson::pearson;
use crate::shapiro::shapiro_wilk;

/// Statistical test family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Pearson correlation of date-aligned closes.
    Pearson,
    /// Shapiro-Wilk normality of one asset's aligned closes.
    ShapiroWilk,
    /// Chi-squared independence of month trends.
    ChiSquare,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestKind::Pearson => "Pearson correlation",
            TestKind::ShapiroWilk => "Shapiro-Wilk normality",
            TestKind::ChiSquare => "Chi-squared association",
        };
        f.write_str(name)
    }
}

/// Result of one statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Computed {
        /// r, W or chi2 depending on the test.
        statistic: f64,
        p_value: f64,
        /// Observations the statistic was computed from.
        n: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        degrees_of_freedom: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        observed: Option<ContingencyTable>,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected: Option<[[f64; 2]; 2]>,
        interpretation: String,
    },
    NotComputable {
        reason: String,
    },
}

impl Outcome {
    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed { .. })
    }

    pub fn p_value(&self) -> Option<f64> {
        match self {
            Outcome::Computed { p_value, .. } => Some(*p_value),
            Outcome::NotComputable { .. } => None,
        }
    }

    pub fn statistic(&self) -> Option<f64> {
        match self {
            Outcome::Computed { statistic, .. } => Some(*statistic),
            Outcome::NotComputable { .. } => None,
        }
    }
}

/// One labelled statistic, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatResult {
    pub test: TestKind,
    /// "Bitcoin - Ethereum" for pairs, "Bitcoin" for single series.
    pub label: String,
    /// Assets the statistic was computed from.
    pub assets: Vec<String>,
    pub outcome: Outcome,
}

impl StatResult {
    /// Whether this result involves the given asset.
    pub fn involves(&self, asset: &str) -> bool {
        self.assets.iter().any(|a| a == asset)
    }
}

/// Every precomputed statistic of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Significance level used for interpretation.
    pub alpha: f64,
    /// Number of dates shared by all assets.
    pub aligned_dates: usize,
    pub results: Vec<StatResult>,
}

impl StatsSummary {
    pub fn of_kind(&self, test: TestKind) -> impl Iterator<Item = &StatResult> {
        self.results.iter().filter(move |r| r.test == test)
    }

    pub fn involving<'a>(&'a self, asset: &'a str) -> impl Iterator<Item = &'a StatResult> {
        self.results.iter().filter(move |r| r.involves(asset))
    }

    pub fn get(&self, test: TestKind, label: &str) -> Option<&StatResult> {
        self.results.iter().find(|r| r.test == test && r.label == label)
    }
}

/// Comparative statistics engine.
pub struct StatisticsEngine {
    config: StatsConfig,
}

impl StatisticsEngine {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Compute all statistics for the given `(asset, records)` tables.
    ///
    /// Closes are aligned on the dates shared by every asset before the
    /// Pearson and Shapiro-Wilk tests. Only fatal errors are returned.
    pub fn run(&self, tables: &[(&str, &[CanonicalRecord])]) -> Result<StatsSummary> {
        let aligned = match AlignedCloses::join(tables) {
            Ok(aligned) => Ok(aligned),
            Err(e) if !e.is_fatal() => {
                warn!(error = %e, "Date alignment failed");
                Err(e.to_string())
            }
            Err(e) => return Err(e),
        };

        let aligned_dates = aligned.as_ref().map(|a| a.len()).unwrap_or(0);
        info!(assets = tables.len(), aligned_dates, "Computing comparative statistics");

        let mut results = Vec::new();

        for (i, (a, _)) in tables.iter().enumerate() {
            for (b, _) in &tables[i + 1..] {
                results.push(self.correlation(&aligned, a, b)?);
            }
        }

        for (asset, _) in tables {
            results.push(self.normality(&aligned, asset)?);
        }

        for (i, a) in tables.iter().enumerate() {
            for b in &tables[i + 1..] {
                results.push(self.association(*a, *b)?);
            }
        }

        let computed = results.iter().filter(|r| r.outcome.is_computed()).count();
        info!(
            computed,
            not_computable = results.len() - computed,
            "Comparative statistics ready"
        );

        Ok(StatsSummary {
            alpha: self.config.alpha,
            aligned_dates,
            results,
        })
    }

    /// Pearson correlation of two assets' aligned closes.
    fn correlation(
        &self,
        aligned: &std::result::Result<AlignedCloses, String>,
        a: &str,
        b: &str,
    ) -> Result<StatResult> {
        let label = format!("{} - {}", a, b);
        let assets = vec![a.to_string(), b.to_string()];

        let aligned = match aligned {
            Ok(aligned) => aligned,
            Err(reason) => return Ok(not_computable(TestKind::Pearson, label, assets, reason.clone())),
        };

        let (x, y) = match (aligned.column(a), aligned.column(b)) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(Error::other(format!("{} is not part of the aligned table", label))),
        };

        let outcome = pearson(x, y).map(|r| Outcome::Computed {
            statistic: r.coefficient,
            p_value: r.p_value,
            n: r.n,
            degrees_of_freedom: r.n.checked_sub(2),
            observed: None,
            expected: None,
            interpretation: interpret::pearson(r.coefficient, r.p_value, self.config.alpha),
        });
        settle(TestKind::Pearson, label, assets, outcome)
    }

    /// Shapiro-Wilk test of one asset's aligned closes.
    fn normality(
        &self,
        aligned: &std::result::Result<AlignedCloses, String>,
        asset: &str,
    ) -> Result<StatResult> {
        let label = asset.to_string();
        let assets = vec![asset.to_string()];

        let aligned = match aligned {
            Ok(aligned) => aligned,
            Err(reason) => {
                return Ok(not_computable(TestKind::ShapiroWilk, label, assets, reason.clone()))
            }
        };

        let sample = aligned
            .column(asset)
            .ok_or_else(|| Error::other(format!("{} is not part of the aligned table", asset)))?;

        let max_n = self.config.shapiro_max_n;
        let approximate = sample.len() > max_n;
        if approximate {
            warn!(asset, n = sample.len(), max_n, "Sample exceeds reliable Shapiro-Wilk size");
        }

        let outcome = shapiro_wilk(sample).map(|r| {
            let mut interpretation = interpret::shapiro(r.statistic, r.p_value, self.config.alpha);
            if approximate {
                interpretation.push_str(&format!("; p-value approximate for n > {}", max_n));
            }
            Outcome::Computed {
                statistic: r.statistic,
                p_value: r.p_value,
                n: r.n,
                degrees_of_freedom: None,
                observed: None,
                expected: None,
                interpretation,
            }
        });
        settle(TestKind::ShapiroWilk, label, assets, outcome)
    }

    /// Chi-squared association of two assets' month trends.
    fn association(
        &self,
        a: (&str, &[CanonicalRecord]),
        b: (&str, &[CanonicalRecord]),
    ) -> Result<StatResult> {
        let label = format!("{} vs {}", a.0, b.0);
        let assets = vec![a.0.to_string(), b.0.to_string()];

        let table = trend_table(a.1, b.1, self.config.trend_alignment);
        let outcome = chi_square_independence(&table, self.config.yates_correction).map(|r| {
            Outcome::Computed {
                statistic: r.statistic,
                p_value: r.p_value,
                n: table.total() as usize,
                degrees_of_freedom: Some(r.dof),
                observed: Some(r.observed),
                expected: Some(r.expected),
                interpretation: interpret::chi_square(r.statistic, r.p_value, self.config.alpha),
            }
        });
        settle(TestKind::ChiSquare, label, assets, outcome)
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}

fn not_computable(test: TestKind, label: String, assets: Vec<String>, reason: String) -> StatResult {
    StatResult {
        test,
        label,
        assets,
        outcome: Outcome::NotComputable { reason },
    }
}

/// Turn a local precondition failure into a not-computable result.
fn settle(
    test: TestKind,
    label: String,
    assets: Vec<String>,
    outcome: Result<Outcome>,
) -> Result<StatResult> {
    match outcome {
        Ok(outcome) => Ok(StatResult {
            test,
            label,
            assets,
            outcome,
        }),
        Err(e) if !e.is_fatal() => {
            warn!(%test, %label, error = %e, "Statistic not computable");
            Ok(not_computable(test, label, assets, e.to_string()))
        }
        Err(e) => Err(e),
    }
}
