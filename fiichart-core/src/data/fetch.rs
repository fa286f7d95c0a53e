//! Fetch orchestrator: one attempt per ticker, failures isolated per ticker.

use super::provider::{DataUnavailable, FetchProgress, MarketDataProvider};
use crate::domain::{PriceSeries, PriceSeriesSet, Ticker};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How per-ticker requests are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// One request after another, in input order.
    #[default]
    Sequential,
    /// Requests run on the rayon pool; results are merged in input order.
    Parallel,
}

/// Outcome of a batch fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Successfully fetched series, in input order.
    pub series: PriceSeriesSet,
    /// Tickers that failed, with the reason, in input order.
    pub failures: Vec<(Ticker, DataUnavailable)>,
    /// The `end` shared by every request of this batch.
    pub end: DateTime<Utc>,
}

impl FetchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch every ticker from `start` up to the current moment.
///
/// `end` is read from the clock once, before the first request, and shared by
/// every ticker of the batch.
pub fn fetch_all(
    provider: &dyn MarketDataProvider,
    tickers: &[Ticker],
    start: DateTime<Utc>,
    mode: FetchMode,
    progress: &dyn FetchProgress,
) -> FetchOutcome {
    fetch_all_until(provider, tickers, start, Utc::now(), mode, progress)
}

/// [`fetch_all`] with an explicit shared `end`.
pub fn fetch_all_until(
    provider: &dyn MarketDataProvider,
    tickers: &[Ticker],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mode: FetchMode,
    progress: &dyn FetchProgress,
) -> FetchOutcome {
    let unique = dedup_preserving_order(tickers);
    let total = unique.len();
    tracing::info!(
        provider = provider.name(),
        tickers = total,
        %start,
        %end,
        ?mode,
        "fetching price series"
    );

    let results: Vec<Result<PriceSeries, DataUnavailable>> = match mode {
        FetchMode::Sequential => unique
            .iter()
            .enumerate()
            .map(|(i, ticker)| {
                progress.on_start(ticker, i, total);
                fetch_one(provider, ticker, start, end)
            })
            .collect(),
        FetchMode::Parallel => {
            for (i, ticker) in unique.iter().enumerate() {
                progress.on_start(ticker, i, total);
            }
            unique
                .par_iter()
                .map(|ticker| fetch_one(provider, ticker, start, end))
                .collect()
        }
    };

    let mut outcome = FetchOutcome {
        series: PriceSeriesSet::new(),
        failures: Vec::new(),
        end,
    };

    for (i, (ticker, result)) in unique.into_iter().zip(results).enumerate() {
        let report = result.as_ref().map(PriceSeries::len).map_err(|e| e.clone());
        progress.on_complete(ticker, i, total, &report);

        match result {
            Ok(series) => {
                // Non-empty and unique by construction; a refusal would be a bug upstream.
                if let Err(reason) = outcome.series.insert(ticker.clone(), series) {
                    tracing::error!(%ticker, ?reason, "series rejected by set");
                }
            }
            Err(e) => outcome.failures.push((ticker.clone(), e)),
        }
    }

    progress.on_batch_complete(outcome.series.len(), outcome.failures.len(), total);
    outcome
}

/// Single attempt for one ticker. An empty `Ok` series counts as a failure.
fn fetch_one(
    provider: &dyn MarketDataProvider,
    ticker: &Ticker,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<PriceSeries, DataUnavailable> {
    let series = provider.fetch(ticker, start, end)?;
    if series.is_empty() {
        return Err(DataUnavailable::EmptySeries {
            symbol: ticker.to_string(),
        });
    }
    Ok(series)
}

fn dedup_preserving_order(tickers: &[Ticker]) -> Vec<&Ticker> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .filter(|t| {
            let first = seen.insert(*t);
            if !first {
                tracing::debug!(ticker = %t, "skipping repeated ticker");
            }
            first
        })
        .collect()
}
