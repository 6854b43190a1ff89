//! Report session for the cryptostat comparison.
//!
//! This crate handles:
//! - Explicit session initialization into an immutable context
//! - Chart series per asset and across assets
//! - Asset selection views over precomputed results

pub mod context;
pub mod series;
pub mod view;

pub use context::{AssetSeries, AssetTable, CrossAssetSeries, ReportContext};
pub use series::{
    BoxSummary, DatedValue, FiveNumber, Histogram, HistogramSeries, MonthDistribution,
    MonthlyVolume, Scatter,
};
pub use view::AssetView;
