//! fiichart: five-year closing-price charts for a fixed list of FIIs.
//!
//! Fetches every ticker, shows the combined chart in the terminal, then saves
//! it and one chart per ticker into a fresh `FII-<timestamp>` directory.

mod logging;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use fiichart_core::data::{ConsoleProgress, YahooProvider};
use fiichart_core::pipeline::{self, ChartDisplay, NoDisplay, RunContext};
use fiichart_core::{FetchMode, FiiChartConfig, OutputLocation, Ticker};
use fiichart_tui::TerminalViewer;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Tickers charted on every run.
const TICKERS: [&str; 10] = [
    "HGLG11.SA",
    "HGBS11.SA",
    "KNRI11.SA",
    "XPML11.SA",
    "VISC11.SA",
    "VRTA11.SA",
    "HGRE11.SA",
    "RNGO11.SA",
    "MXRF11.SA",
    "RECT11.SA",
];

#[derive(Parser)]
#[command(
    name = "fiichart",
    about = "Five-year closing-price charts for a fixed list of Brazilian FIIs"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config dir>/fiichart/config.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory under which the FII-<timestamp> directory is created.
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Skip the interactive chart and only save images.
    #[arg(long, default_value_t = false)]
    no_display: bool,

    /// Fetch tickers concurrently.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let default_path = dirs::config_dir().map(|d| d.join("fiichart").join("config.toml"));
    let mut config = load_config(cli.config.as_deref(), default_path.as_deref())?;
    apply_overrides(&mut config, &cli);

    let tickers: Vec<Ticker> = TICKERS.into_iter().map(Ticker::new).collect();

    let started = Local::now();
    let mut output = OutputLocation::for_run(&config.output_root, &started);

    let provider =
        YahooProvider::new(&config.provider).context("failed to build the HTTP client")?;

    let mut display: Box<dyn ChartDisplay> = if !config.display {
        Box::new(NoDisplay)
    } else if !std::io::stdout().is_terminal() {
        tracing::info!("stdout is not a terminal; skipping the interactive chart");
        Box::new(NoDisplay)
    } else {
        Box::new(TerminalViewer::new())
    };

    let ctx = RunContext {
        tickers: &tickers,
        now: started.with_timezone(&Utc),
        fetch_mode: config.fetch_mode,
        chart: config.chart,
    };

    let report = pipeline::run(
        &ctx,
        &provider,
        &ConsoleProgress,
        display.as_mut(),
        &mut output,
    )
    .with_context(|| format!("run failed writing to {}", output.dir().display()))?;

    tracing::info!(
        fetched = report.series.len(),
        failed = report.failures.len(),
        charts = report.ticker_charts.len() + 1,
        "run complete"
    );
    println!("Files saved to: {}", report.output_dir.display());
    Ok(())
}

/// Explicit path first, then the per-user default if it exists, then defaults.
fn load_config(explicit: Option<&Path>, default_path: Option<&Path>) -> Result<FiiChartConfig> {
    if let Some(path) = explicit {
        return FiiChartConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    match default_path {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "using per-user config");
            FiiChartConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        _ => Ok(FiiChartConfig::default()),
    }
}

fn apply_overrides(config: &mut FiiChartConfig, cli: &Cli) {
    if let Some(root) = &cli.output_root {
        config.output_root = root.clone();
    }
    if cli.no_display {
        config.display = false;
    }
    if cli.parallel {
        config.fetch_mode = FetchMode::Parallel;
    }
}
