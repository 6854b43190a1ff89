use anyhow::Result;
use clap::{Parser, ValueEnum};
use cryptostat_report::{AssetView, ReportContext};
use cryptostat_stats::StatsSummary;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;
mod settings;

/// Compare the price history of several crypto assets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults to ./cryptostat.toml when present.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Show the detail of one asset (e.g., "Bitcoin").
    #[arg(long, short)]
    asset: Option<String>,

    /// Output format.
    #[arg(long, short, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// JSON document for a single selected asset.
#[derive(Serialize)]
struct AssetReport<'a> {
    statistics: &'a StatsSummary,
    asset: &'a AssetView<'a>,
}

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cryptostat=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = settings::load(cli.config.as_deref())?;
    info!(assets = config.assets.len(), "Configuration loaded");

    let ctx = ReportContext::initialize(&config)?;
    let view = cli.asset.as_deref().map(|asset| ctx.view(asset)).transpose()?;

    match cli.format {
        Format::Text => {
            let mut text = String::new();
            render::summary(&mut text, &ctx)?;
            if let Some(view) = &view {
                text.push('\n');
                render::asset(&mut text, view)?;
            }
            print!("{}", text);
        }
        Format::Json => {
            let value = match &view {
                Some(view) => serde_json::to_value(AssetReport {
                    statistics: ctx.stats(),
                    asset: view,
                })?,
                None => serde_json::to_value(&ctx)?,
            };
            let text = if cli.pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{}", text);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from(["cryptostat", "--asset", "Bitcoin", "--format", "json", "--pretty"]);
        assert_eq!(cli.asset.as_deref(), Some("Bitcoin"));
        assert!(cli.format == Format::Json);
        assert!(cli.pretty);
        assert!(cli.config.is_none());

        let cli = Cli::parse_from(["cryptostat"]);
        assert!(cli.format == Format::Text);
    }
}
