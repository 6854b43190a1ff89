//! Plain-text rendering of a report session.

use cryptostat_report::{AssetView, ReportContext};
use cryptostat_stats::{Outcome, StatResult, TestKind};
use std::fmt::{self, Write};

fn write_result(out: &mut impl Write, result: &StatResult) -> fmt::Result {
    match &result.outcome {
        Outcome::Computed {
            statistic,
            p_value,
            n,
            observed,
            interpretation,
            ..
        } => {
            writeln!(
                out,
                "  {:<28} stat = {:>10.4}  p = {:<10.3e} n = {:<6} {}",
                result.label, statistic, p_value, n, interpretation
            )?;
            if let Some(table) = observed {
                let [[ii, id], [di, dd]] = table.counts();
                writeln!(
                    out,
                    "  {:<28} observed [[{}, {}], [{}, {}]] (rows {}, cols {}: Increased, Decreased)",
                    "", ii, id, di, dd, result.assets[0], result.assets[1]
                )?;
            }
            Ok(())
        }
        Outcome::NotComputable { reason } => {
            writeln!(out, "  {:<28} not computable: {}", result.label, reason)
        }
    }
}

fn write_section<'a>(
    out: &mut impl Write,
    title: &str,
    results: impl Iterator<Item = &'a StatResult>,
) -> fmt::Result {
    writeln!(out, "{}", title)?;
    for result in results {
        write_result(out, result)?;
    }
    writeln!(out)
}

const SECTIONS: [(TestKind, &str); 3] = [
    (TestKind::Pearson, "Correlation of closing prices"),
    (TestKind::ShapiroWilk, "Normality of closing prices"),
    (TestKind::ChiSquare, "Association of monthly trends"),
];

/// Session overview: row counts and every statistic.
pub fn summary(out: &mut impl Write, ctx: &ReportContext) -> fmt::Result {
    let stats = ctx.stats();

    writeln!(out, "Assets")?;
    for asset in ctx.assets() {
        if let Some(table) = ctx.table(asset) {
            let first = table.records.iter().map(|r| r.date).min();
            let last = table.records.iter().map(|r| r.date).max();
            let range = match (first, last) {
                (Some(first), Some(last)) => format!("{} .. {}", first, last),
                _ => "empty".to_string(),
            };
            writeln!(out, "  {:<12} {:>6} rows  {}", asset, table.records.len(), range)?;
        }
    }
    writeln!(
        out,
        "  {} dates shared by all assets, alpha = {}\n",
        stats.aligned_dates, stats.alpha
    )?;

    for (kind, title) in SECTIONS {
        write_section(out, title, stats.of_kind(kind))?;
    }
    Ok(())
}

/// Detail of one selected asset.
pub fn asset(out: &mut impl Write, view: &AssetView<'_>) -> fmt::Result {
    writeln!(out, "{} ({} rows)\n", view.asset, view.rows)?;

    writeln!(out, "First rows")?;
    for r in view.head {
        writeln!(
            out,
            "  {}  close {:>14.4}  volume {:>18.2}  {:<12} {}",
            r.date, r.close, r.volume, r.month_name, r.month_trend
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Monthly volume")?;
    for m in &view.series.monthly_volume {
        writeln!(out, "  {}  {:>20.2}", m.period, m.volume)?;
    }
    writeln!(out)?;

    writeln!(out, "Close by month")?;
    for m in &view.series.monthly_close {
        let s = &m.summary;
        writeln!(
            out,
            "  {:<12} min {:>12.4}  q1 {:>12.4}  median {:>12.4}  q3 {:>12.4}  max {:>12.4}",
            m.month_name, s.min, s.q1, s.median, s.q3, s.max
        )?;
    }
    writeln!(out)?;

    for (kind, title) in SECTIONS {
        write_section(
            out,
            title,
            view.statistics.iter().copied().filter(move |r| r.test == kind),
        )?;
    }
    Ok(())
}
