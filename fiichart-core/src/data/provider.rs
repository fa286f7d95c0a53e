//! Market data provider trait, the per-ticker failure type and progress hooks.
//!
//! The MarketDataProvider trait isolates everything provider-specific so the
//! orchestrator can be driven by Yahoo Finance in production and by scripted
//! providers in tests.

use crate::domain::{PriceSeries, Ticker};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a provider could not supply a series for one ticker.
///
/// This is the only recoverable failure in the pipeline: the orchestrator
/// reports it and moves on to the next ticker.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataUnavailable {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider returned no rows for {symbol}")]
    EmptySeries { symbol: String },

    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily price series.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the daily series for `ticker` covering `[start, end]`.
    ///
    /// Which days count as trading days is up to the provider. Implementations
    /// must not retry.
    fn fetch(
        &self,
        ticker: &Ticker,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, DataUnavailable>;
}

/// Progress callbacks for a multi-ticker fetch.
pub trait FetchProgress {
    /// Called before a ticker is requested.
    fn on_start(&self, ticker: &Ticker, index: usize, total: usize);

    /// Called once per ticker with the outcome of its single attempt.
    fn on_complete(
        &self,
        ticker: &Ticker,
        index: usize,
        total: usize,
        result: &Result<usize, DataUnavailable>,
    );

    /// Called when every ticker has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Console line reporting one failed ticker.
pub fn failure_line(ticker: &Ticker, error: &DataUnavailable) -> String {
    format!("Error fetching data for {ticker}: {error}")
}

/// Reporter for the binary: one stderr line per failure, the rest to tracing.
pub struct ConsoleProgress;

impl FetchProgress for ConsoleProgress {
    fn on_start(&self, ticker: &Ticker, index: usize, total: usize) {
        tracing::debug!(%ticker, "[{}/{}] fetching", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &Ticker,
        _index: usize,
        _total: usize,
        result: &Result<usize, DataUnavailable>,
    ) {
        match result {
            Ok(rows) => tracing::info!(%ticker, rows, "fetched"),
            Err(e) => eprintln!("{}", failure_line(ticker, e)),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "fetch batch complete");
    }
}

/// Reporter that drops every event.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _ticker: &Ticker, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _ticker: &Ticker,
        _index: usize,
        _total: usize,
        _result: &Result<usize, DataUnavailable>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
