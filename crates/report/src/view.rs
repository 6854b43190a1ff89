//! Asset selection.

use cryptostat_core::CanonicalRecord;
use cryptostat_stats::{StatResult, StatsSummary};
use serde::Serialize;

use crate::context::{AssetSeries, AssetTable};

/// Everything the report shows for one selected asset.
///
/// Borrows from the context; nothing is recomputed on selection.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView<'a> {
    pub asset: &'a str,
    /// Number of rows in the normalized table.
    pub rows: usize,
    /// Leading rows of the table.
    pub head: &'a [CanonicalRecord],
    pub series: &'a AssetSeries,
    /// Precomputed statistics involving this asset.
    pub statistics: Vec<&'a StatResult>,
}

impl<'a> AssetView<'a> {
    pub(crate) fn new(
        table: &'a AssetTable,
        series: &'a AssetSeries,
        stats: &'a StatsSummary,
        head_rows: usize,
    ) -> Self {
        let head_len = head_rows.min(table.records.len());
        Self {
            asset: &table.asset,
            rows: table.records.len(),
            head: &table.records[..head_len],
            series,
            statistics: stats.involving(&table.asset).collect(),
        }
    }
}
