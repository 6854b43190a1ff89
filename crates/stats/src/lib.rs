//! Comparative statistics for the cryptostat report.
//!
//! This crate handles:
//! - Date alignment of close series and month-name alignment of trend labels
//! - Pearson correlation with a two-sided p-value
//! - Shapiro-Wilk normality test
//! - Chi-squared test of independence on 2x2 trend tables
//! - Interpretation text and the engine that precomputes every result

pub mod chi_square;
pub mod engine;
pub mod interpret;
pub mod join;
pub mod pearson;
pub mod shapiro;

pub use chi_square::{chi_square_independence, ChiSquareResult, ContingencyTable};
pub use engine::{Outcome, StatResult, StatisticsEngine, StatsSummary, TestKind};
pub use join::{trend_table, AlignedCloses};
pub use pearson::{pearson, PearsonResult};
pub use shapiro::{shapiro_wilk, ShapiroResult};
