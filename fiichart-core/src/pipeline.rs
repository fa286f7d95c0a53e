//! End-to-end run: fetch, show, save the combined chart, save per-ticker charts.

use crate::chart::{ChartError, Figure};
use crate::config::ChartSettings;
use crate::data::{fetch_all_until, DataUnavailable, FetchMode, FetchProgress, MarketDataProvider};
use crate::domain::{PriceSeriesSet, Ticker};
use crate::output::{OutputError, OutputLocation};
use chrono::{DateTime, Days, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Fixed lookback: five years of 365 days.
pub const LOOKBACK_DAYS: u64 = 365 * 5;

/// Fatal errors; they terminate the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("interactive display failed: {0}")]
    Display(String),
}

/// Interactive presentation of a figure.
pub trait ChartDisplay {
    /// Show `figure` and return once the user is done with it.
    fn show(&mut self, figure: &Figure) -> Result<(), PipelineError>;
}

/// Display that shows nothing, for headless runs.
pub struct NoDisplay;

impl ChartDisplay for NoDisplay {
    fn show(&mut self, _figure: &Figure) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Inputs of one run.
pub struct RunContext<'a> {
    pub tickers: &'a [Ticker],
    /// Wall-clock start of the run; the end of the fetch window.
    pub now: DateTime<Utc>,
    pub fetch_mode: FetchMode,
    pub chart: ChartSettings,
}

impl RunContext<'_> {
    /// Start of the lookback window.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.now
            .checked_sub_days(Days::new(LOOKBACK_DAYS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub combined_chart: PathBuf,
    pub ticker_charts: Vec<PathBuf>,
    pub series: PriceSeriesSet,
    pub failures: Vec<(Ticker, DataUnavailable)>,
}

/// Run the whole pipeline.
///
/// Fetch failures are reported per ticker and never abort the run; output and
/// rendering failures do.
pub fn run(
    ctx: &RunContext<'_>,
    provider: &dyn MarketDataProvider,
    progress: &dyn FetchProgress,
    display: &mut dyn ChartDisplay,
    output: &mut OutputLocation,
) -> Result<RunReport, PipelineError> {
    let outcome = fetch_all_until(
        provider,
        ctx.tickers,
        ctx.window_start(),
        ctx.now,
        ctx.fetch_mode,
        progress,
    );
    let series = outcome.series;

    if series.is_empty() {
        tracing::warn!(
            requested = ctx.tickers.len(),
            "no ticker was fetched; charts will be empty"
        );
    }

    let combined = Figure::combined(&series)
        .with_size(ctx.chart.combined_width, ctx.chart.combined_height);

    display.show(&combined)?;

    let combined_chart = output.combined_chart_path()?;
    combined.save_png(&combined_chart)?;
    tracing::info!(path = %combined_chart.display(), lines = combined.line_count(), "saved combined chart");

    let mut ticker_charts = Vec::with_capacity(series.len());
    for (ticker, prices) in series.iter() {
        let path = output.ticker_chart_path(ticker)?;
        Figure::single(ticker, prices)
            .with_size(ctx.chart.single_width, ctx.chart.single_height)
            .save_png(&path)?;
        tracing::debug!(%ticker, path = %path.display(), "saved ticker chart");
        ticker_charts.push(path);
    }

    Ok(RunReport {
        output_dir: output.absolute_dir(),
        combined_chart,
        ticker_charts,
        series,
        failures: outcome.failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_start_is_five_years_of_days_back() {
        let ctx = RunContext {
            tickers: &[],
            now: Utc.with_ymd_and_hms(2024, 2, 2, 12, 0, 0).unwrap(),
            fetch_mode: FetchMode::Sequential,
            chart: ChartSettings::default(),
        };
        // 1825 days before 2024-02-02 (two leap days in between).
        assert_eq!(
            ctx.window_start(),
            Utc.with_ymd_and_hms(2019, 2, 3, 12, 0, 0).unwrap()
        );
    }
}
