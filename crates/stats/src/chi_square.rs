//! Chi-squared test of independence on 2x2 trend tables.

use cryptostat_core::{Error, MonthTrend, Result};
use serde::{Deserialize, Serialize};
use statrs::function::gamma::gamma_ur;

/// Observed counts, rows and columns indexed by [`MonthTrend::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContingencyTable {
    counts: [[u64; 2]; 2],
}

impl ContingencyTable {
    pub fn new(counts: [[u64; 2]; 2]) -> Self {
        Self { counts }
    }

    /// Build a table from paired labels.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (MonthTrend, MonthTrend)>,
    {
        let mut counts = [[0u64; 2]; 2];
        for (a, b) in pairs {
            counts[a.index()][b.index()] += 1;
        }
        Self { counts }
    }

    pub fn counts(&self) -> [[u64; 2]; 2] {
        self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn row_totals(&self) -> [u64; 2] {
        [self.counts[0][0] + self.counts[0][1], self.counts[1][0] + self.counts[1][1]]
    }

    pub fn col_totals(&self) -> [u64; 2] {
        [self.counts[0][0] + self.counts[1][0], self.counts[0][1] + self.counts[1][1]]
    }

    /// Expected counts under independence.
    pub fn expected(&self) -> [[f64; 2]; 2] {
        let rows = self.row_totals();
        let cols = self.col_totals();
        let total = self.total() as f64;
        let mut expected = [[0.0; 2]; 2];
        for i in 0..2 {
            for j in 0..2 {
                expected[i][j] = rows[i] as f64 * cols[j] as f64 / total;
            }
        }
        expected
    }
}

/// Chi-squared statistic, p-value, degrees of freedom and expected counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    pub observed: ContingencyTable,
    pub expected: [[f64; 2]; 2],
}

/// Test whether row and column labels are independent.
///
/// With `yates`, each |observed - expected| is reduced by up to 0.5 (the
/// table always has one degree of freedom).
pub fn chi_square_independence(table: &ContingencyTable, yates: bool) -> Result<ChiSquareResult> {
    if table.total() == 0 {
        return Err(Error::insufficient_data("contingency table has no observations"));
    }

    let rows = table.row_totals();
    let cols = table.col_totals();
    for (i, trend) in MonthTrend::ALL.iter().enumerate() {
        if rows[i] == 0 {
            return Err(Error::degenerate_table(format!(
                "first series never shows {}",
                trend
            )));
        }
        if cols[i] == 0 {
            return Err(Error::degenerate_table(format!(
                "second series never shows {}",
                trend
            )));
        }
    }

    let dof = 1;
    let expected = table.expected();
    let observed = table.counts();

    let mut statistic = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let mut diff = (observed[i][j] as f64 - expected[i][j]).abs();
            if yates {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / expected[i][j];
        }
    }

    let p_value = if statistic > 0.0 {
        gamma_ur(dof as f64 / 2.0, statistic / 2.0).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Ok(ChiSquareResult {
        statistic,
        p_value,
        dof,
        observed: *table,
        expected,
    })
}
