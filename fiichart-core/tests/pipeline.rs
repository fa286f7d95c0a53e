//! End-to-end pipeline runs against a scripted provider.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use fiichart_core::config::ChartSettings;
use fiichart_core::data::{
    failure_line, DataUnavailable, FetchMode, FetchProgress, MarketDataProvider,
};
use fiichart_core::{
    run, ChartDisplay, DailyBar, Figure, OutputLocation, PipelineError, PriceSeries, RunContext,
    Ticker,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Serves canned series; any ticker without one fails as not found.
struct CannedProvider {
    series: HashMap<String, PriceSeries>,
    calls: Mutex<Vec<(String, DateTime<Utc>)>>,
}

impl CannedProvider {
    fn new(entries: &[(&str, usize)]) -> Self {
        let d0 = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let series = entries
            .iter()
            .map(|&(sym, n)| {
                let bars = (0..n as u64)
                    .map(|i| DailyBar::close_only(d0 + Days::new(i), 100.0 + i as f64))
                    .collect();
                (sym.to_string(), PriceSeries::from_bars(bars))
            })
            .collect();
        Self {
            series,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MarketDataProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    fn fetch(
        &self,
        ticker: &Ticker,
        _start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, DataUnavailable> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), end));
        self.series
            .get(ticker.as_str())
            .cloned()
            .ok_or_else(|| DataUnavailable::SymbolNotFound {
                symbol: ticker.to_string(),
            })
    }
}

/// Captures the failure lines the console reporter prints.
#[derive(Default)]
struct RecordingProgress {
    lines: RefCell<Vec<String>>,
}

impl FetchProgress for RecordingProgress {
    fn on_start(&self, _ticker: &Ticker, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        ticker: &Ticker,
        _index: usize,
        _total: usize,
        result: &Result<usize, DataUnavailable>,
    ) {
        if let Err(e) = result {
            self.lines.borrow_mut().push(failure_line(ticker, e));
        }
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

/// Records the line count of every figure it is asked to show.
#[derive(Default)]
struct CountingDisplay {
    shown: Vec<usize>,
}

impl ChartDisplay for CountingDisplay {
    fn show(&mut self, figure: &Figure) -> Result<(), PipelineError> {
        self.shown.push(figure.line_count());
        Ok(())
    }
}

fn small_charts() -> ChartSettings {
    ChartSettings {
        combined_width: 320,
        combined_height: 240,
        single_width: 320,
        single_height: 200,
    }
}

fn context(tickers: &[Ticker]) -> RunContext<'_> {
    RunContext {
        tickers,
        now: Utc.with_ymd_and_hms(2024, 2, 2, 15, 30, 0).unwrap(),
        fetch_mode: FetchMode::Sequential,
        chart: small_charts(),
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn one_success_one_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let tickers = vec![Ticker::new("A"), Ticker::new("B")];
    let provider = CannedProvider::new(&[("A", 3)]);
    let progress = RecordingProgress::default();
    let mut display = CountingDisplay::default();
    let ctx = context(&tickers);
    let mut output = OutputLocation::for_run(tmp.path(), &ctx.now);

    let report = run(&ctx, &provider, &progress, &mut display, &mut output).unwrap();

    assert_eq!(report.series.len(), 1);
    assert_eq!(report.series.get(&Ticker::new("A")).unwrap().len(), 3);
    assert_eq!(display.shown, vec![1]);

    assert_eq!(
        file_names(output.dir()),
        vec!["A_historico.png", "grafico_completo.png"]
    );
    assert!(!output.dir().join("B_historico.png").exists());
    assert_eq!(report.ticker_charts.len(), 1);

    let lines = progress.lines.borrow();
    assert_eq!(
        *lines,
        vec!["Error fetching data for B: symbol not found: B".to_string()]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, Ticker::new("B"));
}

#[test]
fn empty_ticker_list_still_saves_combined_chart() {
    let tmp = tempfile::tempdir().unwrap();
    let tickers: Vec<Ticker> = Vec::new();
    let provider = CannedProvider::new(&[]);
    let mut display = CountingDisplay::default();
    let ctx = context(&tickers);
    let mut output = OutputLocation::for_run(tmp.path(), &ctx.now);

    let report = run(
        &ctx,
        &provider,
        &RecordingProgress::default(),
        &mut display,
        &mut output,
    )
    .unwrap();

    assert!(report.series.is_empty());
    assert_eq!(display.shown, vec![0]);
    assert!(output.dir().is_dir());
    assert!(report.combined_chart.exists());
    assert!(report.ticker_charts.is_empty());
    assert_eq!(file_names(output.dir()), vec!["grafico_completo.png"]);
}

#[test]
fn output_directory_is_named_and_created_once() {
    let tmp = tempfile::tempdir().unwrap();
    let tickers: Vec<Ticker> = ["HGLG11.SA", "KNRI11.SA", "MXRF11.SA", "GONE11.SA"]
        .into_iter()
        .map(Ticker::new)
        .collect();
    let provider = CannedProvider::new(&[("HGLG11.SA", 5), ("KNRI11.SA", 4), ("MXRF11.SA", 2)]);
    let ctx = context(&tickers);
    let mut output = OutputLocation::for_run(tmp.path(), &ctx.now);

    let report = run(
        &ctx,
        &provider,
        &RecordingProgress::default(),
        &mut fiichart_core::NoDisplay,
        &mut output,
    )
    .unwrap();

    assert_eq!(output.creations(), 1);
    assert_eq!(
        output.dir().file_name().unwrap(),
        "FII-02-02-2024-15-30-00"
    );
    assert!(report.output_dir.is_absolute());
    // Per-ticker chart count follows the set, not the request list.
    assert_eq!(report.ticker_charts.len(), report.series.len());
    assert_eq!(report.ticker_charts.len(), 3);
    assert_eq!(file_names(output.dir()).len(), 4);
}

#[test]
fn every_fetch_in_a_run_shares_the_run_clock() {
    let tmp = tempfile::tempdir().unwrap();
    let tickers: Vec<Ticker> = ["A", "B", "C"].into_iter().map(Ticker::new).collect();
    let provider = CannedProvider::new(&[("A", 2), ("C", 2)]);
    let ctx = context(&tickers);
    let mut output = OutputLocation::for_run(tmp.path(), &ctx.now);

    run(
        &ctx,
        &provider,
        &RecordingProgress::default(),
        &mut fiichart_core::NoDisplay,
        &mut output,
    )
    .unwrap();

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, end)| *end == ctx.now));
}

#[test]
fn display_failure_aborts_before_saving() {
    struct BrokenDisplay;
    impl ChartDisplay for BrokenDisplay {
        fn show(&mut self, _figure: &Figure) -> Result<(), PipelineError> {
            Err(PipelineError::Display("terminal gone".into()))
        }
    }

    let tmp = tempfile::tempdir().unwrap();
    let tickers = vec![Ticker::new("A")];
    let provider = CannedProvider::new(&[("A", 3)]);
    let ctx = context(&tickers);
    let mut output = OutputLocation::for_run(tmp.path(), &ctx.now);

    let err = run(
        &ctx,
        &provider,
        &RecordingProgress::default(),
        &mut BrokenDisplay,
        &mut output,
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::Display(_)));
    assert!(!output.dir().exists());
}
